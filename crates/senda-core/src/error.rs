// ── Core error types ──
//
// User-facing errors from senda-core. Consumers never see raw HTTP or JSON
// failures: the `From<senda_api::Error>` impl translates transport-layer
// errors into domain variants.

use thiserror::Error;

use crate::forms::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- sign in again")]
    SessionExpired,

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A failed read or write, carrying the backend's message.
    #[error("Data access failed: {message}")]
    DataAccess {
        message: String,
        /// PostgREST / Postgres error code (e.g. `PGRST301`, `23503`).
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<senda_api::Error> for CoreError {
    fn from(err: senda_api::Error) -> Self {
        if err.is_conflict() {
            return Self::Conflict {
                message: err.to_string(),
            };
        }

        match err {
            senda_api::Error::Authentication { message } => Self::AuthenticationFailed { message },
            senda_api::Error::SessionExpired => Self::SessionExpired,
            senda_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    Self::DataAccess {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            senda_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            senda_api::Error::Tls(msg) => Self::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            senda_api::Error::Backend {
                status,
                message,
                code,
                details,
                hint,
            } => {
                let mut message = message;
                if let Some(details) = details.filter(|d| !d.is_empty()) {
                    message = format!("{message} ({details})");
                }
                if let Some(hint) = hint.filter(|h| !h.is_empty()) {
                    message = format!("{message} -- hint: {hint}");
                }
                Self::DataAccess {
                    message,
                    code,
                    status: Some(status),
                }
            }
            senda_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn backend_errors_keep_message_and_code() {
        let err = CoreError::from(senda_api::Error::Backend {
            status: 400,
            message: "insert violates foreign key".into(),
            code: Some("23503".into()),
            details: Some("Key is not present".into()),
            hint: None,
        });

        match err {
            CoreError::DataAccess {
                message,
                code,
                status,
            } => {
                assert_eq!(message, "insert violates foreign key (Key is not present)");
                assert_eq!(code.as_deref(), Some("23503"));
                assert_eq!(status, Some(400));
            }
            other => panic!("expected DataAccess, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_tag_becomes_conflict() {
        let err = CoreError::from(senda_api::Error::Backend {
            status: 409,
            message: "duplicate key value violates unique constraint".into(),
            code: Some("23505".into()),
            details: None,
            hint: None,
        });
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[test]
    fn expired_session_is_preserved() {
        let err = CoreError::from(senda_api::Error::SessionExpired);
        assert!(matches!(err, CoreError::SessionExpired));
    }
}
