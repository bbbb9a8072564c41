// Async HTTP client for the GoTrue auth surface.
//
// Base path: /auth/v1/
// Password sign-in and refresh go through `POST token?grant_type=...`.

use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{TransportConfig, bearer};

// ── Wire types ───────────────────────────────────────────────────────

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Tokens issued by a successful sign-in or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// The auth service has used several error shapes over time.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the backend's auth service.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    /// Build from a project URL and anon key.
    pub fn new(
        project_url: &str,
        anon_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_api_key(anon_key)?;
        let base_url = crate::service_url(project_url, "auth/v1")?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages the `apikey` header).
    pub fn with_client(http: reqwest::Client, project_url: &str) -> Result<Self, Error> {
        let base_url = crate::service_url(project_url, "auth/v1")?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Exchange email + password for a token pair.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, Error> {
        let url = self.url("token")?;
        debug!("POST {url} grant_type=password email={email}");

        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let resp = self
            .http
            .post(url)
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await?;
        handle_auth_response(resp).await
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, Error> {
        let url = self.url("token")?;
        debug!("POST {url} grant_type=refresh_token");

        let body = serde_json::json!({ "refresh_token": refresh_token.expose_secret() });
        let resp = self
            .http
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .json(&body)
            .send()
            .await?;
        handle_auth_response(resp).await
    }

    /// Look up the user that owns `access_token`.
    pub async fn user(&self, access_token: &SecretString) -> Result<AuthUser, Error> {
        let url = self.url("user")?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, bearer(access_token)?)
            .send()
            .await?;
        handle_auth_response(resp).await
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &SecretString) -> Result<(), Error> {
        let url = self.url("logout")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, bearer(access_token)?)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_auth_error(status, resp).await)
        }
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_auth_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e}"),
            body,
        })
    } else {
        Err(parse_auth_error(status, resp).await)
    }
}

async fn parse_auth_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(ErrorResponse::into_message)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    let rejected =
        status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN;
    if rejected && message.contains("expired") {
        return Error::SessionExpired;
    }

    Error::Authentication { message }
}
