//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use senda_config::ConfigError;
use senda_core::CoreError;
use senda_core::forms::ValidationErrors;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(senda::connection_failed),
        help(
            "Check the project URL and your network connection.\n\
             Reason: {reason}\n\
             Self-hosted with a self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(senda::auth_failed),
        help(
            "Verify the email and password for profile '{profile}'.\n\
             Run: senda config set-password {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Session expired")]
    #[diagnostic(code(senda::session_expired), help("Run the command again to sign in anew."))]
    SessionExpired,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(senda::no_credentials),
        help(
            "Configure credentials with: senda config init\n\
             Or set SENDA_EMAIL and SENDA_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("No anon key configured for profile '{profile}'")]
    #[diagnostic(
        code(senda::no_anon_key),
        help(
            "The anon key is in your project's API settings.\n\
             Set it with: senda config set-password --with-anon-key\n\
             Or set SENDA_ANON_KEY."
        )
    )]
    NoAnonKey { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(senda::not_found),
        help("Run: senda {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Record already exists: {message}")]
    #[diagnostic(
        code(senda::conflict),
        help("Tags must be unique within your herd. Pick another tag.")
    )]
    Conflict { message: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Backend error: {message}")]
    #[diagnostic(
        code(senda::backend),
        help("Re-run with -vv to see the request that failed.")
    )]
    Backend { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(senda::validation))]
    Validation { field: String, reason: String },

    #[error("{count} field(s) failed validation")]
    #[diagnostic(code(senda::invalid_form), help("{details}"))]
    InvalidForm { count: usize, details: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(senda::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: senda config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(senda::no_config),
        help(
            "Create one with: senda config init\n\
             Expected at: {path}\n\
             Or pass --url, --anon-key and --email."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(senda::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(senda::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(senda::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Internal ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(senda::io))]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(senda::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::SessionExpired
            | Self::NoCredentials { .. }
            | Self::NoAnonKey { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::InvalidForm { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the profile in auth failures raised below the config layer.
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.to_owned(),
                message,
            },
            other => other,
        }
    }

    pub(crate) fn animal_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "Animal".into(),
            identifier: identifier.into(),
            list_command: "animals list".into(),
        }
    }
}

// ── Form errors → CliError ───────────────────────────────────────────

impl From<ValidationErrors> for CliError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("\n");
        Self::InvalidForm {
            count: errors.len(),
            details,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::SessionExpired => Self::SessionExpired,

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: format!("{}s list", entity_type.to_lowercase()),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Conflict { message } => Self::Conflict { message },

            CoreError::DataAccess { message, code, .. } => Self::Backend {
                message: match code {
                    Some(code) => format!("{message} [{code}]"),
                    None => message,
                },
            },

            CoreError::Validation(errors) => errors.into(),

            CoreError::Config { message } => Self::Config { message },

            CoreError::Io(e) => Self::Io(e),

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::NoAnonKey { profile } => Self::NoAnonKey { profile },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
