use thiserror::Error;

/// PostgREST code for "the result contains 0 rows" on single-object requests.
pub(crate) const NO_ROWS_CODE: &str = "PGRST116";

/// Postgres `unique_violation`, surfaced when a tag is reused.
pub(crate) const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Top-level error type for the `senda-api` crate.
///
/// Covers authentication, transport, and the structured error bodies
/// returned by the REST and auth services. `senda-core` maps these into
/// domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in or token refresh rejected by the auth service.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Access token expired or revoked (HTTP 401 from the REST service).
    #[error("Session expired -- sign in again")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Structured error from the REST service (`{code, message, details, hint}`).
    #[error("Backend error (HTTP {status}): {message}")]
    Backend {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the backend rejected a write as a duplicate.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Backend { status: 409, .. } => true,
            Self::Backend { code: Some(code), .. } => code == UNIQUE_VIOLATION_CODE,
            _ => false,
        }
    }

    /// Extract the backend error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
