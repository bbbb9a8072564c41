//! Command dispatch: bridges CLI args -> core views and forms -> output formatting.

pub mod activity;
pub mod animals;
pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod notifications;
pub mod reports;
pub mod reproductions;
pub mod util;
pub mod vaccines;

use senda_core::{Backend, Credentials, DataAccess, Session};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Config, Settings, Target};
use crate::error::CliError;

/// A signed-in backend plus the resolved presentation settings.
pub struct Context {
    pub backend: Backend,
    pub session: Session,
    pub settings: Settings,
    pub profile_name: String,
}

impl Context {
    /// Resolve the profile, build the backend client and sign in through
    /// the credential chain.
    pub async fn connect(
        global: &GlobalOpts,
        cfg: &Config,
        settings: Settings,
    ) -> Result<Self, CliError> {
        let target = config::resolve_target(global, cfg)?;
        let credentials = target.credentials()?;
        Self::sign_in(target, &credentials, settings).await
    }

    pub(crate) async fn sign_in(
        target: Target,
        credentials: &Credentials,
        settings: Settings,
    ) -> Result<Self, CliError> {
        let backend = Backend::new(target.backend)?;

        let spinner = util::spinner("Signing in…", settings.quiet);
        let session = backend.sign_in(credentials).await;
        spinner.finish_and_clear();

        let session = session.map_err(|e| CliError::from(e).with_profile(&target.profile_name))?;
        tracing::debug!(profile = %target.profile_name, "session ready");

        Ok(Self {
            backend,
            session,
            settings,
            profile_name: target.profile_name,
        })
    }

    pub fn data(&self) -> &DataAccess {
        self.backend.data()
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Animals(args) => animals::handle(ctx, args).await,
        Command::Vaccines(args) => vaccines::handle(ctx, args).await,
        Command::Reproductions(args) => reproductions::handle(ctx, args.command).await,
        Command::Dashboard(args) => dashboard::handle(ctx, args).await,
        Command::Reports(args) => reports::handle(ctx, args).await,
        Command::Activity(args) => activity::handle(ctx, args).await,
        Command::Notifications(args) => notifications::handle(ctx, args).await,
        // Config, Completions and Auth are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Auth(_) => Err(CliError::Internal(
            "command should not reach dispatch".into(),
        )),
    }
}
