//! Animal command handlers: the herd table, carnet and animal forms.

use chrono::{NaiveDate, Utc};
use tabled::Tabled;

use senda_core::display::label_or_dash;
use senda_core::forms::{self, AnimalForm, EditAnimalForm, HealthForm};
use senda_core::views::{AnimalCard, Carnet, CattleTable, WholeAge};
use senda_core::{Animal, CattleFilter, ColumnFilter, CoreError, Labelled, Locale, Vaccine};

use crate::cli::{AnimalFields, AnimalsArgs, AnimalsCommand, EditFields, OutputFormat};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AnimalRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Breed")]
    breed: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Weight (kg)")]
    weight: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Farm")]
    farm: String,
}

impl AnimalRow {
    fn new(a: &Animal, today: NaiveDate, locale: Locale, color: bool) -> Self {
        Self {
            tag: a.tag.clone(),
            name: a.name.clone(),
            gender: a.gender.label(locale).into_owned(),
            age: WholeAge::between(a.birth_date, today).label(locale),
            breed: a.breed.clone(),
            status: output::paint(&a.status.label(locale), a.status.attrs().color, color),
            weight: a.weight.clone().unwrap_or_default(),
            owner: a.owner.clone().unwrap_or_default(),
            farm: a.farm.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vaccine")]
    vaccine: String,
    #[tabled(rename = "Next dose")]
    next: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&Vaccine> for HistoryRow {
    fn from(v: &Vaccine) -> Self {
        Self {
            date: v.date.to_string(),
            vaccine: v.vaccine_type.clone(),
            next: v.next_date.map(|d| d.to_string()).unwrap_or_default(),
            notes: v.notes.clone().unwrap_or_default(),
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn detail(a: &Animal, today: NaiveDate, locale: Locale, color: bool) -> String {
    let age = WholeAge::between(a.birth_date, today).label(locale);
    let lines = [
        format!("ID:         {}", a.id),
        format!("Tag:        {}", a.tag),
        format!("Name:       {}", a.name),
        format!("Gender:     {}", a.gender.label(locale)),
        format!("Born:       {} ({age})", a.birth_date),
        format!(
            "Entered:    {}",
            a.entry_date.map_or_else(|| "-".into(), |d| d.to_string())
        ),
        format!("Breed:      {}", a.breed),
        format!(
            "Status:     {}",
            output::paint(&a.status.label(locale), a.status.attrs().color, color)
        ),
        format!("Ear tag:    {}", label_or_dash(a.ear_tag.as_ref(), locale)),
        format!("Weight:     {} kg", util::or_dash(a.weight.as_deref())),
        format!("Owner:      {}", util::or_dash(a.owner.as_deref())),
        format!("Farm:       {}", util::or_dash(a.farm.as_deref())),
        format!("Paddock:    {}", util::or_dash(a.paddock.as_deref())),
        format!("Purpose:    {}", label_or_dash(a.purpose.as_ref(), locale)),
        format!("Category:   {}", label_or_dash(a.category.as_ref(), locale)),
    ];
    lines.join("\n")
}

fn carnet_detail(card: &AnimalCard, today: NaiveDate, locale: Locale, color: bool) -> String {
    let title = match locale {
        Locale::En => "Vaccination history",
        Locale::Es => "Historial de vacunación",
    };
    let history = if card.vaccines.is_empty() {
        output::muted(
            match locale {
                Locale::En => "No vaccines recorded",
                Locale::Es => "Sin vacunas registradas",
            },
            color,
        )
    } else {
        let rows: Vec<HistoryRow> = card.vaccines.iter().map(HistoryRow::from).collect();
        output::render_table(&rows)
    };
    format!(
        "{}\n\n{}\n{history}",
        detail(&card.animal, today, locale, color),
        output::heading(title, color)
    )
}

fn print_animal(ctx: &Context, animal: &Animal, today: NaiveDate) -> Result<(), CliError> {
    let s = ctx.settings;
    let out = output::render_single(
        s.output,
        animal,
        |a| detail(a, today, s.locale, s.color),
        |a| a.id.clone(),
    )?;
    output::print_output(&out, s.quiet);
    Ok(())
}

// ── Input helpers ───────────────────────────────────────────────────

fn parse_filter(raw: &str) -> Result<ColumnFilter, CliError> {
    raw.parse::<ColumnFilter>().map_err(|e| match e {
        CoreError::Config { message } => CliError::Validation {
            field: "filter".into(),
            reason: message,
        },
        other => other.into(),
    })
}

fn fill_new(form: &mut AnimalForm, fields: AnimalFields) {
    let v = &mut form.values;
    v.tag = fields.tag;
    v.name = fields.name;
    v.breed = fields.breed;
    v.weight = fields.weight;
    v.owner = fields.owner;
    v.farm = fields.farm;
    let optional = [
        (&mut v.gender, fields.gender),
        (&mut v.birth_date, fields.birth_date),
        (&mut v.entry_date, fields.entry_date),
        (&mut v.status, fields.status),
        (&mut v.ear_tag, fields.ear_tag),
        (&mut v.purpose, fields.purpose),
        (&mut v.category, fields.category),
    ];
    for (slot, value) in optional {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn fill_edit(form: &mut EditAnimalForm, fields: EditFields) {
    let v = &mut form.values;
    let overrides = [
        (&mut v.name, fields.name),
        (&mut v.gender, fields.gender),
        (&mut v.birth_date, fields.birth_date),
        (&mut v.entry_date, fields.entry_date),
        (&mut v.breed, fields.breed),
        (&mut v.ear_tag, fields.ear_tag),
        (&mut v.farm, fields.farm),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: AnimalsArgs) -> Result<(), CliError> {
    let s = ctx.settings;
    let today = Utc::now().date_naive();

    match args.command {
        AnimalsCommand::List { search, filter } => {
            let filter = CattleFilter {
                search,
                column: filter.as_deref().map(parse_filter).transpose()?,
            };
            let table = CattleTable::load(ctx.data(), &ctx.session, &filter).await?;
            let out = output::render_list(
                s.output,
                &table.animals,
                |a| AnimalRow::new(a, today, s.locale, s.color),
                |a| a.tag.clone(),
            )?;
            output::print_output(&out, s.quiet);
            if s.output == OutputFormat::Table && !filter.is_empty() {
                output::notice(
                    &format!("{} of {} animals", table.animals.len(), table.total),
                    s.quiet,
                );
            }
            Ok(())
        }

        AnimalsCommand::Show { animal } => {
            match Carnet::load(ctx.data(), &ctx.session, &animal, today).await? {
                Carnet::Found(card) => {
                    let out = output::render_single(
                        s.output,
                        card.as_ref(),
                        |c| carnet_detail(c, today, s.locale, s.color),
                        |c| c.animal.id.clone(),
                    )?;
                    output::print_output(&out, s.quiet);
                    Ok(())
                }
                Carnet::NotFound { query } => {
                    let message = match s.locale {
                        Locale::En => format!("No animal matches '{query}'"),
                        Locale::Es => format!("Ningún animal coincide con '{query}'"),
                    };
                    if s.output == OutputFormat::Table {
                        output::print_output(&output::muted(&message, s.color), s.quiet);
                    } else {
                        output::notice(&message, s.quiet);
                    }
                    Ok(())
                }
            }
        }

        AnimalsCommand::Create(fields) => {
            let mut form = AnimalForm::new(today);
            fill_new(&mut form, fields);
            let animal = forms::submit(&mut form, ctx.data(), &ctx.session, |a| {
                tracing::info!(id = %a.id, tag = %a.tag, "animal registered");
            })
            .await?;
            output::notice(&format!("Animal {} registered", animal.tag), s.quiet);
            print_animal(ctx, &animal, today)
        }

        AnimalsCommand::Edit { animal, fields } => {
            let mut form = EditAnimalForm::load(ctx.data(), &ctx.session, &animal).await?;
            fill_edit(&mut form, fields);
            let animal = forms::submit(&mut form, ctx.data(), &ctx.session, |_| {}).await?;
            output::notice(&format!("Animal {} updated", animal.tag), s.quiet);
            print_animal(ctx, &animal, today)
        }

        AnimalsCommand::Status { animal, status } => {
            let mut form = HealthForm::load(ctx.data(), &ctx.session, &animal).await?;
            form.status = status;
            let animal = forms::submit(&mut form, ctx.data(), &ctx.session, |_| {}).await?;
            output::notice(
                &format!(
                    "{} is now {}",
                    animal.tag,
                    output::paint(
                        &animal.status.label(s.locale),
                        animal.status.attrs().color,
                        s.color,
                    )
                ),
                s.quiet,
            );
            Ok(())
        }

        AnimalsCommand::Delete { animal } => {
            let target = util::resolve_animal(ctx, &animal).await?;
            let prompt = format!("Delete {} ({})?", target.name, target.tag);
            if !util::confirm(&prompt, s.yes, "animals delete")? {
                return Ok(());
            }
            ctx.data().delete_animal(&ctx.session, &target.id).await?;
            output::notice(&format!("Animal {} deleted", target.tag), s.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use senda_core::FilterColumn;

    use super::{fill_edit, parse_filter};
    use crate::cli::{AnimalsCommand, Cli, Command};
    use crate::error::CliError;

    #[test]
    fn filter_flag_parses_column_and_value() {
        let filter = parse_filter("ear_tag=Celeste").unwrap();
        assert_eq!(filter.column, FilterColumn::EarTag);
        assert_eq!(filter.value, "Celeste");
    }

    #[test]
    fn bad_filter_is_a_usage_error() {
        let err = parse_filter("colour=red").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "filter"));
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn edit_keeps_fields_that_were_not_passed() {
        let cli = Cli::try_parse_from(["senda", "animals", "edit", "SND-001", "--farm", "El Roble"])
            .unwrap();
        let Command::Animals(args) = cli.command else {
            panic!("expected animals");
        };
        let AnimalsCommand::Edit { fields, .. } = args.command else {
            panic!("expected edit");
        };

        let mut form = senda_core::forms::EditAnimalForm::from_animal(&sample());
        fill_edit(&mut form, fields);
        assert_eq!(form.values.farm, "El Roble");
        assert_eq!(form.values.name, "Lucera");
    }

    fn sample() -> senda_core::Animal {
        use chrono::{NaiveDate, TimeZone, Utc};
        use senda_core::{Gender, HealthStatus};

        senda_core::Animal {
            id: "a1".into(),
            tag: "SND-001".into(),
            name: "Lucera".into(),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            entry_date: None,
            breed: "Brahman".into(),
            status: HealthStatus::Healthy,
            ear_tag: None,
            owner: Some("Ana".into()),
            farm: Some("La Senda".into()),
            paddock: None,
            purpose: None,
            weight: Some("420".into()),
            category: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            user_id: "u1".into(),
        }
    }
}
