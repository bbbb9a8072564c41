//! Shared configuration for senda: TOML profiles, figment loading, and
//! credential resolution.
//!
//! The library crates never read this directly. The binary loads a
//! [`Config`], picks a [`Profile`], and hands `senda-core` a finished
//! [`BackendConfig`] plus sign-in [`Credentials`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use senda_core::{BackendConfig, Credentials, Locale, TlsVerification};

/// Keyring service name for every stored secret.
pub const KEYRING_SERVICE: &str = "senda";

/// Overrides the config file location (used by tests and scripted installs).
pub const CONFIG_PATH_ENV: &str = "SENDA_CONFIG";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no anon key configured for profile '{profile}'")]
    NoAnonKey { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub locale: Locale,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            locale: Locale::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// One backend project plus the account used to sign in to it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Project URL (e.g. "https://abcd.supabase.co").
    pub url: String,

    /// Public anon key (plaintext -- prefer keyring or env var).
    pub anon_key: Option<String>,

    /// Environment variable name containing the anon key.
    pub anon_key_env: Option<String>,

    /// Sign-in email.
    pub email: Option<String>,

    /// Password (plaintext -- prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate (self-hosted stacks).
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    /// Overrides `defaults.locale` for this profile.
    pub locale: Option<Locale>,
}

impl Config {
    /// Profile name from an explicit choice, then `default_profile`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_owned(),
                available: self.profiles.keys().cloned().collect(),
            })
    }

    /// A copy safe to print: plaintext secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for profile in copy.profiles.values_mut() {
            if profile.anon_key.is_some() {
                profile.anon_key = Some(REDACTED.into());
            }
            if profile.password.is_some() {
                profile.password = Some(REDACTED.into());
            }
        }
        copy
    }
}

// ── Config file path ────────────────────────────────────────────────

/// `$SENDA_CONFIG`, else the platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "senda", "senda").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("senda");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the default file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path`, then `SENDA_*` variables (`__` separates nesting,
/// e.g. `SENDA_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SENDA_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults when it is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// The secrets senda keeps per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    AnonKey,
    Password,
}

impl SecretKind {
    fn entry_name(self, profile_name: &str) -> String {
        match self {
            Self::AnonKey => format!("{profile_name}/anon-key"),
            Self::Password => format!("{profile_name}/password"),
        }
    }
}

fn keyring_secret(profile_name: &str, kind: SecretKind) -> Option<SecretString> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.entry_name(profile_name))
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Store a secret in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.entry_name(profile_name))?;
    entry.set_password(value)?;
    Ok(())
}

/// Remove a stored secret. Missing entries are not an error.
pub fn delete_secret(profile_name: &str, kind: SecretKind) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.entry_name(profile_name))?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Anon key: `SENDA_ANON_KEY`, the profile's `anon_key_env`, keyring,
/// then plaintext.
pub fn resolve_anon_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(key) = env_secret("SENDA_ANON_KEY") {
        return Ok(key);
    }
    if let Some(key) = profile.anon_key_env.as_deref().and_then(env_secret) {
        return Ok(key);
    }
    if let Some(key) = keyring_secret(profile_name, SecretKind::AnonKey) {
        return Ok(key);
    }
    profile
        .anon_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoAnonKey {
            profile: profile_name.into(),
        })
}

/// Password: the profile's `password_env`, `SENDA_PASSWORD`, keyring,
/// then plaintext.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(pw) = profile.password_env.as_deref().and_then(env_secret) {
        return Ok(pw);
    }
    if let Some(pw) = env_secret("SENDA_PASSWORD") {
        return Ok(pw);
    }
    if let Some(pw) = keyring_secret(profile_name, SecretKind::Password) {
        return Ok(pw);
    }
    profile
        .password
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Email from the profile or `SENDA_EMAIL`, plus the resolved password.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("SENDA_EMAIL").ok())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    Ok(Credentials { email, password })
}

// ── Profile → BackendConfig ─────────────────────────────────────────

/// Connection settings for `profile` with an already-resolved anon key.
pub fn backend_config(
    profile: &Profile,
    anon_key: SecretString,
    default_timeout: u64,
) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = BackendConfig::new(url, anon_key);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout));
    Ok(config)
}

/// Resolve the anon key through its chain and build the backend config.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
    default_timeout: u64,
) -> Result<BackendConfig, ConfigError> {
    let anon_key = resolve_anon_key(profile, profile_name)?;
    backend_config(profile, anon_key, default_timeout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use secrecy::{ExposeSecret, SecretString};
    use senda_core::{Locale, TlsVerification};

    use super::*;

    fn profile() -> Profile {
        Profile {
            url: "https://herd.example.co".into(),
            anon_key: Some("anon".into()),
            email: Some("ana@example.com".into()),
            password: Some("s3cret".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "finca"

[defaults]
output = "json"
locale = "es"

[profiles.finca]
url = "https://herd.example.co"
email = "ana@example.com"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("finca"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.defaults.locale, Locale::Es);
        assert_eq!(cfg.profile("finca").unwrap().timeout, Some(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile());

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn unknown_profile_lists_the_available_ones() {
        let mut cfg = Config::default();
        cfg.profiles.insert("norte".into(), profile());

        match cfg.profile("sur").unwrap_err() {
            ConfigError::ProfileNotFound { name, available } => {
                assert_eq!(name, "sur");
                assert_eq!(available, ["norte"]);
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
        assert_eq!(cfg.active_profile_name(None), "default");
        assert_eq!(cfg.active_profile_name(Some("norte")), "norte");
    }

    #[test]
    fn redaction_masks_plaintext_secrets_only() {
        let mut cfg = Config::default();
        let mut bare = profile();
        bare.password = None;
        cfg.profiles.insert("a".into(), profile());
        cfg.profiles.insert("b".into(), bare);

        let shown = cfg.redacted();
        assert_eq!(shown.profiles["a"].password.as_deref(), Some("********"));
        assert_eq!(shown.profiles["a"].anon_key.as_deref(), Some("********"));
        assert_eq!(shown.profiles["b"].password, None);
        assert_eq!(shown.profiles["a"].email, cfg.profiles["a"].email);
    }

    #[test]
    fn backend_config_applies_tls_and_timeout() {
        let mut p = profile();
        p.insecure = Some(true);
        let config = backend_config(&p, SecretString::from("anon"), 30).unwrap();
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.anon_key.expose_secret(), "anon");

        p.insecure = None;
        p.ca_cert = Some("/etc/ssl/herd.pem".into());
        p.timeout = Some(7);
        let config = backend_config(&p, SecretString::from("anon"), 30).unwrap();
        assert_eq!(config.tls, TlsVerification::CustomCa("/etc/ssl/herd.pem".into()));
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let mut p = profile();
        p.url = "not a url".into();
        let err = backend_config(&p, SecretString::from("anon"), 30).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
    }
}
