//! Auth subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use secrecy::{ExposeSecret, SecretString};

use senda_config::ConfigError;
use senda_core::{Credentials, UserIdentity};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::commands::Context;
use crate::config::{self, Config, SecretKind, Settings, Target};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

fn detail(user: &UserIdentity) -> String {
    [
        format!("User ID:     {}", user.id),
        format!("Email:       {}", user.email.as_deref().unwrap_or("-")),
        format!(
            "Last signed: {}",
            user.last_sign_in_at
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        ),
    ]
    .join("\n")
}

/// The credential chain, falling back to prompts on a terminal.
fn login_credentials(target: &Target) -> Result<Credentials, CliError> {
    let interactive = std::io::stdin().is_terminal();
    let no_credentials = || CliError::NoCredentials {
        profile: target.profile_name.clone(),
    };

    let email = match target.profile.email.clone().filter(|e| !e.is_empty()) {
        Some(email) => email,
        None if interactive => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
        None => return Err(no_credentials()),
    };

    let password = match senda_config::resolve_password(&target.profile, &target.profile_name) {
        Ok(password) => password,
        Err(ConfigError::NoCredentials { .. }) if interactive => {
            SecretString::from(rpassword::prompt_password("Password: ").map_err(prompt_err)?)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Credentials { email, password })
}

pub async fn handle(
    args: AuthArgs,
    global: &GlobalOpts,
    cfg: &Config,
    settings: Settings,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login { save } => {
            let target = config::resolve_target(global, cfg)?;
            let credentials = login_credentials(&target)?;
            let ctx = Context::sign_in(target, &credentials, settings).await?;

            if save {
                config::store_secret(
                    &ctx.profile_name,
                    SecretKind::Password,
                    credentials.password.expose_secret(),
                )?;
                output::notice("Password stored in system keyring", settings.quiet);
            }

            output::notice(
                &format!(
                    "Signed in as {} (profile '{}')",
                    ctx.session.email().unwrap_or(ctx.session.user_id()),
                    ctx.profile_name
                ),
                settings.quiet,
            );
            Ok(())
        }

        AuthCommand::Whoami => {
            let ctx = Context::connect(global, cfg, settings).await?;
            let user = ctx.backend.whoami(&ctx.session).await?;
            let out = output::render_single(settings.output, &user, detail, |u| u.id.clone())?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        AuthCommand::Logout => {
            let ctx = Context::connect(global, cfg, settings).await?;
            ctx.backend.sign_out(&ctx.session).await?;
            if let Err(e) = config::delete_secret(&ctx.profile_name, SecretKind::Password) {
                tracing::warn!(error = %e, "could not clear stored password");
            }
            output::notice(
                &format!("Signed out of profile '{}'", ctx.profile_name),
                settings.quiet,
            );
            Ok(())
        }
    }
}
