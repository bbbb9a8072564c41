mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ReproductionsCommand};
use crate::commands::Context;
use crate::config::Settings;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let settings = Settings::resolve(&cli.global, &cfg);

    match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global, settings),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "senda", &mut std::io::stdout());
            Ok(())
        }

        // Pure date arithmetic, no sign-in
        Command::Reproductions(args) => match args.command {
            ReproductionsCommand::DueDate { service_date } => {
                commands::reproductions::due_date(&service_date, settings)
            }
            command => {
                let ctx = Context::connect(&cli.global, &cfg, settings).await?;
                commands::reproductions::handle(&ctx, command).await
            }
        },

        // Login may prompt for what the credential chain lacks
        Command::Auth(args) => commands::auth::handle(args, &cli.global, &cfg, settings).await,

        // All other commands require a signed-in session
        cmd => {
            let ctx = Context::connect(&cli.global, &cfg, settings).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx).await
        }
    }
}
