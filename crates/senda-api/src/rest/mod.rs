// Async HTTP client for the PostgREST table surface.
//
// Base path: /rest/v1/
// Auth: `apikey` default header + per-call `Authorization: Bearer <token>`

pub mod models;
mod query;

pub use query::{Order, Query};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, NO_ROWS_CODE};
use crate::transport::{TransportConfig, bearer};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

// ── Error response shape from the REST service ───────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the backend's REST table access.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference-counted.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a project URL and anon key.
    ///
    /// Injects `apikey` as a default header on every request.
    pub fn new(
        project_url: &str,
        anon_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_api_key(anon_key)?;
        let base_url = crate::service_url(project_url, "rest/v1")?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages the `apikey` header).
    pub fn with_client(http: reqwest::Client, project_url: &str) -> Result<Self, Error> {
        let base_url = crate::service_url(project_url, "rest/v1")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, table: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(table)?)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Return every row matching `query`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        query: &Query,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(query.table_name())?;
        let params = query.read_params();
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, bearer(token)?)
            .query(&params)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Return the single row matching `query`, or `None` when nothing matches.
    ///
    /// More than one match is reported as a backend error.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        query: &Query,
    ) -> Result<Option<T>, Error> {
        let url = self.url(query.table_name())?;
        let params = query.read_params();
        debug!("GET {url} params={params:?} (single)");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, bearer(token)?)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .query(&params)
            .send()
            .await?;

        match handle_response(resp).await {
            Ok(row) => Ok(Some(row)),
            Err(Error::Backend {
                code: Some(ref code),
                ref details,
                ..
            }) if code == NO_ROWS_CODE && !is_multiple_rows(details.as_deref()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert one row and return its stored representation.
    pub async fn insert<B, T>(&self, token: &SecretString, table: &str, row: &B) -> Result<T, Error>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(table)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, bearer(token)?)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
            .json(row)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Patch every row matching `query` and return the updated rows.
    pub async fn update<B, T>(
        &self,
        token: &SecretString,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<T>, Error>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        require_filters(query)?;
        let url = self.url(query.table_name())?;
        let params = query.write_params();
        debug!("PATCH {url} params={params:?}");

        let resp = self
            .http
            .patch(url)
            .header(AUTHORIZATION, bearer(token)?)
            .header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
            .query(&params)
            .json(patch)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Delete every row matching `query`, returning the deleted rows.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        query: &Query,
    ) -> Result<Vec<T>, Error> {
        require_filters(query)?;
        let url = self.url(query.table_name())?;
        let params = query.write_params();
        debug!("DELETE {url} params={params:?}");

        let resp = self
            .http
            .delete(url)
            .header(AUTHORIZATION, bearer(token)?)
            .header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
            .query(&params)
            .send()
            .await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// An unfiltered PATCH/DELETE would hit every row the policy allows.
fn require_filters(query: &Query) -> Result<(), Error> {
    if query.has_filters() {
        Ok(())
    } else {
        Err(Error::Backend {
            status: 400,
            message: format!("refusing unfiltered write to '{}'", query.table_name()),
            code: None,
            details: None,
            hint: Some("add an eq(...) filter".into()),
        })
    }
}

fn is_multiple_rows(details: Option<&str>) -> bool {
    details.is_some_and(|d| !d.contains(" 0 rows"))
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::UNAUTHORIZED && raw.contains("JWT expired") {
        return Error::SessionExpired;
    }

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        Error::Backend {
            status: status.as_u16(),
            message: err.message.unwrap_or_else(|| status.to_string()),
            code: err.code,
            details: err.details,
            hint: err.hint,
        }
    } else {
        Error::Backend {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: None,
            details: None,
            hint: None,
        }
    }
}
