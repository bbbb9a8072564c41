// ── Runtime backend configuration ──
//
// These types describe *how* to reach the hosted backend. They carry
// credential data and connection tuning, but never touch disk: the CLI
// builds a `BackendConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default for hosted projects.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-hosted stacks with self-signed certs).
    DangerAcceptInvalid,
}

/// Email/password pair for signing in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Connection settings for one backend project.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL (e.g. `https://abcd.supabase.co`).
    pub url: Url,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url, anon_key: SecretString) -> Self {
        Self {
            url,
            anon_key,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> senda_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => senda_api::TlsMode::System,
            TlsVerification::CustomCa(path) => senda_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => senda_api::TlsMode::DangerAcceptInvalid,
        };
        senda_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
