//! General dashboard handler: KPI cards, distributions and upcoming events.

use chrono::{NaiveDate, Utc};
use tabled::Tabled;

use senda_core::aggregate::{GenderAgeRow, OwnerShare, StatusShare};
use senda_core::chart::write_charts;
use senda_core::views::DashboardView;
use senda_core::{Event, Labelled, Locale};

use crate::cli::{DashboardArgs, OutputFormat};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "%")]
    percentage: String,
}

impl ShareRow {
    fn status(share: &StatusShare, locale: Locale, color: bool) -> Self {
        Self {
            label: output::paint(&share.status.label(locale), share.color, color),
            count: share.count,
            percentage: format!("{:.1}", share.percentage),
        }
    }

    fn owner(share: &OwnerShare, locale: Locale, color: bool) -> Self {
        let name = share.owner.as_deref().unwrap_or(match locale {
            Locale::En => "Unassigned",
            Locale::Es => "Sin propietario",
        });
        Self {
            label: output::paint(name, share.color, color),
            count: share.count,
            percentage: format!("{:.1}", share.percentage),
        }
    }
}

#[derive(Tabled)]
struct AgeRow {
    #[tabled(rename = "Age (years)")]
    bucket: String,
    #[tabled(rename = "Male")]
    male: usize,
    #[tabled(rename = "Female")]
    female: usize,
}

impl From<&GenderAgeRow> for AgeRow {
    fn from(row: &GenderAgeRow) -> Self {
        Self {
            bucket: row.bucket.to_string(),
            male: row.male,
            female: row.female,
        }
    }
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "In")]
    when: String,
    #[tabled(rename = "Event")]
    event: String,
}

impl EventRow {
    fn new(e: &Event, today: NaiveDate, locale: Locale) -> Self {
        let days = (e.date - today).num_days();
        Self {
            date: e.date.to_string(),
            when: if days < 0 {
                match locale {
                    Locale::En => format!("{} days overdue", -days),
                    Locale::Es => format!("Atrasado {} días", -days),
                }
            } else {
                senda_core::display::days_until_label(days, locale)
            },
            event: e.describe(locale),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn section(title: &str, body: &str, color: bool) -> String {
    format!("{}\n{body}", output::heading(title, color))
}

fn render(view: &DashboardView, locale: Locale, color: bool) -> String {
    let k = &view.kpis;
    let es = locale == Locale::Es;
    let pick = |en: &'static str, sp: &'static str| if es { sp } else { en };

    let mut cards = vec![
        format!("{}: {}", pick("Total animals", "Total de animales"), k.total),
        format!("{}: {}", pick("Healthy", "Saludables"), k.healthy),
        format!("{}: {}", pick("Sick", "Enfermos"), k.sick),
        format!("{}: {}", pick("Critical", "Críticos"), k.critical),
        format!("{}: {}", pick("Pregnant", "Preñadas"), k.pregnant),
        format!(
            "{}: {:.1}",
            pick("Average age (years)", "Edad promedio (años)"),
            k.average_age_years
        ),
        format!(
            "{}: {:.1}",
            pick("Average weight (kg)", "Peso promedio (kg)"),
            k.average_weight_kg
        ),
        format!(
            "{}: {} / {}: {}",
            pick("Vaccines up to date", "Vacunas al día"),
            k.vaccination.up_to_date,
            pick("pending", "pendientes"),
            k.vaccination.pending
        ),
        format!(
            "{}: {} / {}: {}",
            pick("Males", "Machos"),
            k.genders.male,
            pick("Females", "Hembras"),
            k.genders.female
        ),
        format!(
            "{}: {} / {}: {}",
            pick("Pregnant females", "Hembras preñadas"),
            k.pregnancy.pregnant,
            pick("not pregnant", "no preñadas"),
            k.pregnancy.not_pregnant
        ),
    ];
    if let Some(ref farm) = view.farm {
        cards.insert(0, format!("{}: {farm}", pick("Owner", "Propietario")));
    }

    let status: Vec<ShareRow> = k
        .status
        .iter()
        .map(|s| ShareRow::status(s, locale, color))
        .collect();
    let owners: Vec<ShareRow> = k
        .ownership
        .iter()
        .map(|o| ShareRow::owner(o, locale, color))
        .collect();
    let ages: Vec<AgeRow> = k.gender_age.iter().map(AgeRow::from).collect();

    let events = if view.events.is_empty() {
        output::muted(pick("No upcoming events", "Sin eventos próximos"), color)
    } else {
        let rows: Vec<EventRow> = view
            .events
            .iter()
            .map(|e| EventRow::new(e, view.today, locale))
            .collect();
        output::render_table(&rows)
    };

    [
        section(pick("Herd", "Hato"), &cards.join("\n"), color),
        section(pick("Health status", "Estado de salud"), &output::render_table(&status), color),
        section(pick("Ownership", "Propiedad"), &output::render_table(&owners), color),
        section(pick("Gender by age", "Género por edad"), &output::render_table(&ages), color),
        section(pick("Upcoming events", "Próximos eventos"), &events, color),
    ]
    .join("\n\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DashboardArgs) -> Result<(), CliError> {
    let s = ctx.settings;
    let today = Utc::now().date_naive();

    let view = DashboardView::load(ctx.data(), &ctx.session, args.farm.as_deref(), today).await?;

    let out = match s.output {
        OutputFormat::Table => render(&view, s.locale, s.color),
        format => {
            output::render_single(format, &view, |_| String::new(), |v| {
                v.kpis.total.to_string()
            })?
        }
    };
    output::print_output(&out, s.quiet);

    if let Some(dir) = args.svg {
        let charts = view.charts(s.locale)?;
        for path in write_charts(&dir, &charts)? {
            output::notice(&format!("wrote {}", path.display()), s.quiet);
        }
    }
    Ok(())
}
