// Shared transport configuration for building reqwest::Client instances.
//
// The REST and auth clients share TLS and timeout settings through this
// module, and both inject the project `apikey` header the same way.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("senda/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-hosted backends with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with additional default headers.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build a client that sends `apikey: <anon key>` on every request.
    pub fn build_client_with_api_key(
        &self,
        anon_key: &SecretString,
    ) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(api_key_headers(anon_key)?)
    }
}

/// Default headers carrying the project's anonymous key.
pub(crate) fn api_key_headers(anon_key: &SecretString) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let mut key_value =
        HeaderValue::from_str(anon_key.expose_secret()).map_err(|e| Error::Authentication {
            message: format!("invalid anon key header value: {e}"),
        })?;
    key_value.set_sensitive(true);
    headers.insert("apikey", key_value);
    Ok(headers)
}

/// `Authorization: Bearer <token>` value for a user access token.
pub(crate) fn bearer(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(
        |e| Error::Authentication {
            message: format!("invalid access token header value: {e}"),
        },
    )?;
    value.set_sensitive(true);
    Ok(value)
}
