//! Config subcommand handlers.

use dialoguer::{Input, Select};

use senda_core::Locale;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile, SecretKind, Settings};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_secret(label: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Keyring when chosen (returns `None` for the file), else the plaintext value.
fn place_secret(
    profile_name: &str,
    kind: SecretKind,
    value: String,
    use_keyring: bool,
) -> Result<Option<String>, CliError> {
    if use_keyring {
        config::store_secret(profile_name, kind, &value)?;
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn require_profile<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    Ok(cfg.profile(name)?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts, settings: Settings) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default().redacted();
            let out = match settings.output {
                OutputFormat::Table => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                        message: format!("failed to render config: {e}"),
                    })?
                }
                format => output::render_single(
                    format,
                    &cfg,
                    |_| String::new(),
                    |c| c.active_profile_name(global.profile.as_deref()),
                )?,
            };
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                output::notice("No profiles configured. Run: senda config init", settings.quiet);
            } else {
                let lines: Vec<String> = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        let marker = if *name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), settings.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            require_profile(&cfg, &name)?;

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), settings.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword {
            name,
            with_anon_key,
        } => {
            let cfg = config::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            require_profile(&cfg, &profile_name)?;

            let password = prompt_secret("Password: ", "password")?;
            config::store_secret(&profile_name, SecretKind::Password, &password)?;

            if with_anon_key {
                let key = prompt_secret("Anon key: ", "anon_key")?;
                config::store_secret(&profile_name, SecretKind::AnonKey, &key)?;
            }

            output::notice(
                &format!("✓ Secret stored in system keyring for profile '{profile_name}'"),
                settings.quiet,
            );
            Ok(())
        }
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("senda: configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Project URL and anon key
    let url: String = Input::new()
        .with_prompt("Project URL")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("must start with http:// or https://")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;
    let anon_key = prompt_secret("Anon key: ", "anon_key")?;

    // 3. Account
    let email: String = Input::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(prompt_err)?;
    let password = prompt_secret("Password: ", "password")?;

    // 4. Secret storage
    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let use_keyring = Select::new()
        .with_prompt("Where to store the anon key and password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
        == 0;

    let anon_key = place_secret(&profile_name, SecretKind::AnonKey, anon_key, use_keyring)?;
    let password = place_secret(&profile_name, SecretKind::Password, password, use_keyring)?;
    if use_keyring {
        eprintln!("   ✓ Secrets stored in system keyring");
    }

    // 5. Language
    let locale = match Select::new()
        .with_prompt("Label language")
        .items(&["English", "Español"])
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        1 => Locale::Es,
        _ => Locale::En,
    };

    // 6. Merge into the existing file
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            url,
            anon_key,
            email: Some(email),
            password,
            locale: Some(locale),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: senda auth whoami");
    Ok(())
}
