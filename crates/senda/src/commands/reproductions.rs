//! Reproduction command handlers.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tabled::Tabled;

use senda_core::convert::{format_date, parse_date};
use senda_core::forms::{self, ReproductionForm};
use senda_core::{AnimalQuery, Labelled, Locale, Reproduction, expected_birth_date};

use crate::cli::ReproductionsCommand;
use crate::commands::Context;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReproductionRow {
    #[tabled(rename = "Service")]
    service_date: String,
    #[tabled(rename = "Mother")]
    mother: String,
    #[tabled(rename = "Father")]
    father: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Expected birth")]
    expected: String,
    #[tabled(rename = "Born")]
    born: String,
}

impl ReproductionRow {
    fn new(r: &Reproduction, tags: &HashMap<String, String>, locale: Locale) -> Self {
        let tag = |id: &str| tags.get(id).cloned().unwrap_or_else(|| id.to_owned());
        Self {
            service_date: r.service_date.to_string(),
            mother: tag(&r.mother_id),
            father: tag(&r.father_id),
            method: r.service_method.label(locale).into_owned(),
            expected: r.expected_birth_date.to_string(),
            born: r.actual_birth_date.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

fn detail(r: &Reproduction, locale: Locale) -> String {
    let mut lines = vec![
        format!("ID:             {}", r.id),
        format!("Mother:         {}", r.mother_id),
        format!("Father:         {}", r.father_id),
        format!("Method:         {}", r.service_method.label(locale)),
        format!("Service date:   {}", r.service_date),
        format!("Expected birth: {}", r.expected_birth_date),
    ];
    if let Some(ref notes) = r.notes {
        lines.push(format!("Notes:          {notes}"));
    }
    lines.join("\n")
}

// ── Due date ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DueDate {
    service_date: NaiveDate,
    expected_birth_date: NaiveDate,
}

/// Expected birth date for a service date. Needs no backend.
pub fn due_date(raw: &str, settings: Settings) -> Result<(), CliError> {
    let service_date = parse_date(raw).ok_or_else(|| CliError::Validation {
        field: "service_date".into(),
        reason: format!("'{raw}' is not a YYYY-MM-DD date"),
    })?;
    let due = DueDate {
        service_date,
        expected_birth_date: expected_birth_date(service_date),
    };
    let out = output::render_single(
        settings.output,
        &due,
        |d| format_date(d.expected_birth_date),
        |d| format_date(d.expected_birth_date),
    )?;
    output::print_output(&out, settings.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, command: ReproductionsCommand) -> Result<(), CliError> {
    let s = ctx.settings;

    match command {
        ReproductionsCommand::List => {
            let animal_query = AnimalQuery::default();
            let (services, animals) = tokio::try_join!(
                ctx.data().list_reproductions(&ctx.session),
                ctx.data().list_animals(&ctx.session, &animal_query),
            )?;
            let tags: HashMap<String, String> =
                animals.into_iter().map(|a| (a.id, a.tag)).collect();
            let out = output::render_list(
                s.output,
                &services,
                |r| ReproductionRow::new(r, &tags, s.locale),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, s.quiet);
            Ok(())
        }

        ReproductionsCommand::Create {
            mother,
            father,
            method,
            service_date,
            notes,
        } => {
            let mut form =
                ReproductionForm::load(ctx.data(), &ctx.session, Utc::now().date_naive()).await?;
            form.mother = mother;
            form.father = father;
            if let Some(method) = method {
                form.service_method = method;
            }
            if let Some(date) = service_date {
                form.set_service_date(date);
            }
            form.notes = notes;

            let service = forms::submit(&mut form, ctx.data(), &ctx.session, |r| {
                tracing::info!(id = %r.id, "breeding service recorded");
            })
            .await?;
            output::notice(
                &format!("Service recorded, birth expected {}", service.expected_birth_date),
                s.quiet,
            );
            let out = output::render_single(
                s.output,
                &service,
                |r| detail(r, s.locale),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, s.quiet);
            Ok(())
        }

        ReproductionsCommand::DueDate { service_date } => due_date(&service_date, s),
    }
}
