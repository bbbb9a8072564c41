//! CLI configuration: thin wrapper around `senda_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --anon-key, --email, --timeout, ...).

use clap::ValueEnum;
use secrecy::SecretString;

use senda_core::{BackendConfig, Credentials, Locale};

use crate::cli::{ColorMode, GlobalOpts, Lang, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Re-exports from shared crate ────────────────────────────────────

pub use senda_config::{
    Config, Profile, SecretKind, config_path, delete_secret, load_config_or_default,
    save_config, store_secret,
};

// ── Presentation settings ───────────────────────────────────────────

/// How command output is rendered, after flags and config are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub output: OutputFormat,
    pub color: bool,
    pub locale: Locale,
    pub quiet: bool,
    pub yes: bool,
}

impl Settings {
    /// Flags first, then the active profile, then `[defaults]`.
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Self {
        let profile = cfg.profiles.get(&active_profile_name(global, cfg));

        let output = global
            .output
            .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);
        let locale = global
            .lang
            .map(|lang| match lang {
                Lang::En => Locale::En,
                Lang::Es => Locale::Es,
            })
            .or_else(|| profile.and_then(|p| p.locale))
            .unwrap_or(cfg.defaults.locale);

        Self {
            output,
            color: output::should_color(color),
            locale,
            quiet: global.quiet,
            yes: global.yes,
        }
    }
}

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Everything needed to reach the backend and sign in.
#[derive(Debug)]
pub struct Target {
    pub profile_name: String,
    pub profile: Profile,
    pub backend: BackendConfig,
}

/// Pick the profile, apply flag overrides, and resolve the anon key.
///
/// Without a matching profile, `--url` (or `SENDA_URL`) alone is enough
/// to build one from flags and environment.
pub fn resolve_target(global: &GlobalOpts, cfg: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profile(&profile_name) {
        Ok(profile) => profile.clone(),
        Err(_) if global.url.is_some() => Profile::default(),
        Err(_) if cfg.profiles.is_empty() && global.profile.is_none() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.email.is_some() {
        profile.email.clone_from(&global.email);
    }

    let anon_key = match global.anon_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => senda_config::resolve_anon_key(&profile, &profile_name)?,
    };
    let backend = senda_config::backend_config(&profile, anon_key, cfg.defaults.timeout)?;

    Ok(Target {
        profile_name,
        profile,
        backend,
    })
}

impl Target {
    /// Email and password through the credential chain.
    pub fn credentials(&self) -> Result<Credentials, CliError> {
        Ok(senda_config::resolve_credentials(
            &self.profile,
            &self.profile_name,
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use senda_core::Locale;

    use super::{Config, Profile, Settings, resolve_target};
    use crate::cli::{Cli, OutputFormat};
    use crate::error::CliError;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["senda"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["reproductions", "due-date", "2024-01-01"]);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        cfg.defaults.color = "never".into();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                url: "https://herd.example.co".into(),
                anon_key: Some("anon".into()),
                email: Some("ana@example.com".into()),
                locale: Some(Locale::Es),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_config_defaults() {
        let cfg = config();

        let settings = Settings::resolve(&parse(&[]).global, &cfg);
        assert_eq!(settings.output, OutputFormat::Yaml);
        assert!(!settings.color);
        assert_eq!(settings.locale, Locale::Es);

        let settings = Settings::resolve(&parse(&["-o", "json", "--lang", "en"]).global, &cfg);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.locale, Locale::En);
    }

    #[test]
    fn url_flag_overrides_profile() {
        let cli = parse(&[
            "--url",
            "http://localhost:54321",
            "--anon-key",
            "flag",
            "--timeout",
            "5",
        ]);
        let target = resolve_target(&cli.global, &config()).unwrap();
        assert_eq!(target.backend.url.as_str(), "http://localhost:54321/");
        assert_eq!(target.backend.timeout, std::time::Duration::from_secs(5));
        assert_eq!(target.profile_name, "default");
    }

    #[test]
    fn missing_profile_without_url_is_no_config() {
        let cli = parse(&["--anon-key", "flag"]);
        let err = resolve_target(&cli.global, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }), "{err:?}");

        let cli = parse(&["--profile", "sur", "--anon-key", "flag"]);
        let err = resolve_target(&cli.global, &config()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }), "{err:?}");
    }
}
