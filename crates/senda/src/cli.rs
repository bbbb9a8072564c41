//! Clap derive structures for the `senda` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Depends only on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// senda -- herd records and dashboards from the command line
#[derive(Debug, Parser)]
#[command(
    name = "senda",
    version,
    about = "Manage cattle herd records from the command line",
    long_about = "Register animals, vaccines and breeding services, and view the\n\
        herd dashboard, reports, activity and vaccination reminders.\n\n\
        Talks to a hosted PostgREST/GoTrue backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SENDA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Project URL (overrides profile)
    #[arg(long, env = "SENDA_URL", global = true)]
    pub url: Option<String>,

    /// Public anon key (overrides profile)
    #[arg(long, env = "SENDA_ANON_KEY", global = true, hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Sign-in email (overrides profile)
    #[arg(long, env = "SENDA_EMAIL", global = true)]
    pub email: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "SENDA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Display language for labels
    #[arg(long, env = "SENDA_LANG", global = true)]
    pub lang: Option<Lang>,

    /// Request timeout in seconds
    #[arg(long, env = "SENDA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output, Color & Language Enums ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    /// English
    En,
    /// Spanish
    Es,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the herd
    #[command(alias = "a", alias = "cattle")]
    Animals(AnimalsArgs),

    /// Record and list vaccinations
    #[command(alias = "vac")]
    Vaccines(VaccinesArgs),

    /// Record and list breeding services
    #[command(alias = "repro")]
    Reproductions(ReproductionsArgs),

    /// Herd KPIs, distributions and upcoming events
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Registrations and vaccinations over a date range
    Reports(ReportsArgs),

    /// Most recent herd activity
    Activity(ActivityArgs),

    /// Vaccines due within the coming week
    #[command(alias = "notif")]
    Notifications(NotificationsArgs),

    /// Sign in, inspect and revoke the account session
    Auth(AuthArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ANIMALS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AnimalsArgs {
    #[command(subcommand)]
    pub command: AnimalsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnimalsCommand {
    /// List animals, optionally searched and filtered
    #[command(alias = "ls")]
    List {
        /// Text matched against name, tag and breed
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Column filter, e.g. "gender=macho" or "status=sick"
        #[arg(long, short = 'f', value_name = "COLUMN=VALUE")]
        filter: Option<String>,
    },

    /// Show an animal's carnet: profile and vaccination history
    #[command(alias = "get")]
    Show {
        /// Animal ID (UUID) or tag
        animal: String,
    },

    /// Register a new animal
    Create(AnimalFields),

    /// Edit an animal's profile
    Edit {
        /// Animal ID (UUID) or tag
        animal: String,

        #[command(flatten)]
        fields: EditFields,
    },

    /// Change an animal's health status
    Status {
        /// Animal ID (UUID) or tag
        animal: String,

        /// New status: healthy, sick or pregnant (English or Spanish label)
        status: String,
    },

    /// Delete an animal
    #[command(alias = "rm")]
    Delete {
        /// Animal ID (UUID) or tag
        animal: String,
    },
}

#[derive(Debug, Args)]
pub struct AnimalFields {
    /// Identification tag (at least 3 characters)
    #[arg(long)]
    pub tag: String,

    #[arg(long)]
    pub name: String,

    /// male or female [default: male]
    #[arg(long)]
    pub gender: Option<String>,

    /// YYYY-MM-DD [default: today]
    #[arg(long)]
    pub birth_date: Option<String>,

    /// YYYY-MM-DD [default: today]
    #[arg(long)]
    pub entry_date: Option<String>,

    #[arg(long)]
    pub breed: String,

    /// healthy, sick or pregnant [default: healthy]
    #[arg(long)]
    pub status: Option<String>,

    /// red, green, yellow or sky [default: red]
    #[arg(long)]
    pub ear_tag: Option<String>,

    /// Kilograms
    #[arg(long)]
    pub weight: String,

    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub farm: String,

    /// fattening, breeding or sale [default: fattening]
    #[arg(long)]
    pub purpose: Option<String>,

    /// Herd category, e.g. vaca, toro, novillo [default: vaca]
    #[arg(long)]
    pub category: Option<String>,
}

/// Fields left out keep their stored value.
#[derive(Debug, Args)]
pub struct EditFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub birth_date: Option<String>,

    #[arg(long)]
    pub entry_date: Option<String>,

    #[arg(long)]
    pub breed: Option<String>,

    #[arg(long)]
    pub ear_tag: Option<String>,

    #[arg(long)]
    pub farm: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VACCINES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VaccinesArgs {
    #[command(subcommand)]
    pub command: VaccinesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VaccinesCommand {
    /// List vaccinations, newest first
    #[command(alias = "ls")]
    List {
        /// Only this animal (ID or tag)
        #[arg(long, short = 'a')]
        animal: Option<String>,
    },

    /// Record a vaccine application
    Create {
        /// Animal ID (UUID) or tag
        #[arg(long, short = 'a')]
        animal: String,

        /// Vaccine name, e.g. "Aftosa"
        #[arg(long = "type", short = 't')]
        vaccine_type: String,

        /// Application date, YYYY-MM-DD [default: today]
        #[arg(long)]
        date: Option<String>,

        /// Next dose, YYYY-MM-DD
        #[arg(long)]
        next_date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPRODUCTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReproductionsArgs {
    #[command(subcommand)]
    pub command: ReproductionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReproductionsCommand {
    /// List breeding services, latest first
    #[command(alias = "ls")]
    List,

    /// Record a breeding service
    Create {
        /// Mother ID or tag (must be female)
        #[arg(long)]
        mother: String,

        /// Father ID or tag (must be male)
        #[arg(long)]
        father: String,

        /// natural or artificial [default: natural]
        #[arg(long)]
        method: Option<String>,

        /// YYYY-MM-DD [default: today]
        #[arg(long)]
        service_date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Print the expected birth date for a service date (no sign-in needed)
    DueDate {
        /// Service date, YYYY-MM-DD
        service_date: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD / REPORTS / ACTIVITY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Only animals of this owner
    #[arg(long)]
    pub farm: Option<String>,

    /// Also write the dashboard charts as SVG files into this directory
    #[arg(long, value_name = "DIR")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportsArgs {
    /// Date range
    #[arg(long, short = 'r', value_enum, default_value = "week")]
    pub range: ReportRange,

    /// Which records to include
    #[arg(long = "type", short = 't', value_enum, default_value = "all")]
    pub kind: ReportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportRange {
    /// Since midnight (UTC)
    Today,
    /// The last 7 days
    Week,
    /// The last 30 days
    Month,
    /// Everything
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    All,
    /// Animal registrations only
    Animal,
    /// Vaccine applications only
    Vaccine,
}

#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Keep running and reprint when the feed changes
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Refresh interval in seconds when watching
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTIFICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    /// Keep read flags in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List due vaccines with their read state
    #[command(alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long, short = 'u')]
        unread: bool,
    },

    /// Keep running and reprint when notifications change
    Watch {
        /// Refresh interval in seconds
        #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Mark one notification read
    Read {
        /// Notification ID (the vaccine record ID)
        id: String,
    },

    /// Mark every listed notification read
    ReadAll,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in, prompting for the password if none is configured
    Login {
        /// Store the password in the system keyring on success
        #[arg(long)]
        save: bool,
    },

    /// Show the signed-in account
    Whoami,

    /// Revoke the session and forget the stored password
    Logout,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration (secrets masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the password (and optionally the anon key) in the system keyring
    SetPassword {
        /// Profile name [default: the active profile]
        name: Option<String>,

        /// Also prompt for the anon key
        #[arg(long)]
        with_anon_key: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
