//! Vaccine command handlers.

use chrono::Utc;
use tabled::Tabled;

use senda_core::Vaccine;
use senda_core::forms::{self, VaccineForm};

use crate::cli::{VaccinesArgs, VaccinesCommand};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VaccineRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vaccine")]
    vaccine: String,
    #[tabled(rename = "Animal")]
    animal: String,
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Next dose")]
    next: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&Vaccine> for VaccineRow {
    fn from(v: &Vaccine) -> Self {
        let (animal, tag) = v
            .animal
            .as_ref()
            .map(|a| (a.name.clone(), a.tag.clone()))
            .unwrap_or_default();
        Self {
            date: v.date.to_string(),
            vaccine: v.vaccine_type.clone(),
            animal,
            tag,
            next: v.next_date.map(|d| d.to_string()).unwrap_or_default(),
            notes: v.notes.clone().unwrap_or_default(),
        }
    }
}

fn detail(v: &Vaccine) -> String {
    let mut lines = vec![
        format!("ID:        {}", v.id),
        format!("Animal:    {}", v.animal_id),
        format!("Vaccine:   {}", v.vaccine_type),
        format!("Date:      {}", v.date),
    ];
    if let Some(next) = v.next_date {
        lines.push(format!("Next dose: {next}"));
    }
    if let Some(ref notes) = v.notes {
        lines.push(format!("Notes:     {notes}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: VaccinesArgs) -> Result<(), CliError> {
    let s = ctx.settings;

    match args.command {
        VaccinesCommand::List { animal } => {
            let vaccines = match animal {
                Some(ref id_or_tag) => {
                    let animal = util::resolve_animal(ctx, id_or_tag).await?;
                    ctx.data()
                        .list_vaccines_for_animal(&ctx.session, &animal.id)
                        .await?
                }
                None => ctx.data().list_vaccines(&ctx.session, None).await?,
            };
            let out = output::render_list(
                s.output,
                &vaccines,
                |v| VaccineRow::from(v),
                |v| v.id.clone(),
            )?;
            output::print_output(&out, s.quiet);
            Ok(())
        }

        VaccinesCommand::Create {
            animal,
            vaccine_type,
            date,
            next_date,
            notes,
        } => {
            let target = util::resolve_animal(ctx, &animal).await?;

            let mut form = VaccineForm::new(Utc::now().date_naive());
            form.animal_id = target.id;
            form.vaccine_type = vaccine_type;
            if let Some(date) = date {
                form.date = date;
            }
            form.next_date = next_date;
            form.notes = notes;

            let vaccine = forms::submit(&mut form, ctx.data(), &ctx.session, |v| {
                tracing::info!(id = %v.id, animal = %v.animal_id, "vaccine recorded");
            })
            .await?;
            output::notice(
                &format!("{} recorded for {}", vaccine.vaccine_type, target.tag),
                s.quiet,
            );
            let out = output::render_single(s.output, &vaccine, detail, |v| v.id.clone())?;
            output::print_output(&out, s.quiet);
            Ok(())
        }
    }
}
