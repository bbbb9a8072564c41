//! Reports handler: registrations and vaccinations over a date range.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use senda_core::views::{ActivityFilter, DateRange, Report};
use senda_core::{Activity, Locale};

use crate::cli::{OutputFormat, ReportKind, ReportRange, ReportsArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

impl From<ReportRange> for DateRange {
    fn from(range: ReportRange) -> Self {
        match range {
            ReportRange::Today => Self::Today,
            ReportRange::Week => Self::Week,
            ReportRange::Month => Self::Month,
            ReportRange::All => Self::All,
        }
    }
}

impl From<ReportKind> for ActivityFilter {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::All => Self::All,
            ReportKind::Animal => Self::Animal,
            ReportKind::Vaccine => Self::Vaccine,
        }
    }
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    at: String,
    #[tabled(rename = "Activity")]
    activity: String,
}

impl ActivityRow {
    fn new(a: &Activity, locale: Locale) -> Self {
        Self {
            at: a.at.format("%Y-%m-%d %H:%M").to_string(),
            activity: a.describe(locale),
        }
    }
}

fn render(report: &Report, locale: Locale, color: bool) -> String {
    let window = report.since.map_or_else(
        || match locale {
            Locale::En => "all time".to_owned(),
            Locale::Es => "todo el historial".to_owned(),
        },
        |since: DateTime<Utc>| match locale {
            Locale::En => format!("since {}", since.format("%Y-%m-%d %H:%M UTC")),
            Locale::Es => format!("desde {}", since.format("%Y-%m-%d %H:%M UTC")),
        },
    );
    let summary = match locale {
        Locale::En => format!(
            "{} registrations, {} vaccinations ({window})",
            report.animal_count, report.vaccine_count
        ),
        Locale::Es => format!(
            "{} registros, {} vacunaciones ({window})",
            report.animal_count, report.vaccine_count
        ),
    };

    if report.is_empty() {
        let empty = match locale {
            Locale::En => "No activity in this period",
            Locale::Es => "Sin actividad en este período",
        };
        return format!("{}\n{summary}", output::muted(empty, color));
    }

    let rows: Vec<ActivityRow> = report
        .activities
        .iter()
        .map(|a| ActivityRow::new(a, locale))
        .collect();
    format!("{}\n{summary}", output::render_table(&rows))
}

pub async fn handle(ctx: &Context, args: ReportsArgs) -> Result<(), CliError> {
    let s = ctx.settings;

    let report = Report::load(
        ctx.data(),
        &ctx.session,
        args.range.into(),
        args.kind.into(),
        Utc::now(),
    )
    .await?;

    let out = match s.output {
        OutputFormat::Table => render(&report, s.locale, s.color),
        OutputFormat::Plain => report
            .activities
            .iter()
            .map(|a| a.id.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_single(format, &report, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&out, s.quiet);
    Ok(())
}
