// ── API-to-domain type conversions ──
//
// Rows arrive with dates and enums as free text. Required columns that do
// not parse reject the row; optional columns that do not parse become
// `None`. Both cases are logged. Writes go the other way and stamp the
// owning user id.

use std::str::FromStr;

use chrono::NaiveDate;
use senda_api::{
    AnimalRow, AnimalUpdateRow, NewAnimalRow, NewReproductionRow, NewVaccineRow, RecentAnimalRow,
    ReproductionRow, StatusUpdateRow, VaccineRow,
};
use thiserror::Error;
use tracing::warn;

use crate::model::{
    Activity, ActivityKind, Animal, AnimalSummary, AnimalUpdate, Gender, HealthStatus, NewAnimal,
    NewReproduction, NewVaccine, Reproduction, ServiceMethod, Vaccine,
};

/// Dates are exchanged as ISO `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored row whose required column could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} {id}: invalid {field} '{value}'")]
pub struct ConversionError {
    pub entity: &'static str,
    pub id: String,
    pub field: &'static str,
    pub value: String,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Parse an ISO date, also accepting a full timestamp (`2024-06-01T00:00:00Z`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn required_date(
    entity: &'static str,
    id: &str,
    field: &'static str,
    raw: &str,
) -> Result<NaiveDate, ConversionError> {
    parse_date(raw).ok_or_else(|| ConversionError {
        entity,
        id: id.to_owned(),
        field,
        value: raw.to_owned(),
    })
}

fn optional_date(
    entity: &'static str,
    id: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Option<NaiveDate> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        warn!(entity, id, field, value = raw, "ignoring malformed optional date");
    }
    parsed
}

fn optional_enum<T: FromStr>(
    entity: &'static str,
    id: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Option<T> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    let parsed = T::from_str(raw.trim()).ok();
    if parsed.is_none() {
        warn!(entity, id, field, value = raw, "ignoring unrecognised value");
    }
    parsed
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Convert a batch, dropping (and logging) rows that fail.
pub fn convert_rows<R, T>(rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = ConversionError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping malformed row");
                None
            }
        })
        .collect()
}

// ── animals ──────────────────────────────────────────────────────────

impl TryFrom<AnimalRow> for Animal {
    type Error = ConversionError;

    fn try_from(row: AnimalRow) -> Result<Self, Self::Error> {
        const ENTITY: &str = "animal";

        let gender = Gender::from_str(row.gender.trim()).map_err(|_| ConversionError {
            entity: ENTITY,
            id: row.id.clone(),
            field: "gender",
            value: row.gender.clone(),
        })?;
        let birth_date = required_date(ENTITY, &row.id, "birth_date", &row.birth_date)?;
        let entry_date = optional_date(ENTITY, &row.id, "entry_date", row.entry_date.as_deref());
        let ear_tag = optional_enum(ENTITY, &row.id, "ear_tag", row.ear_tag.as_deref());
        let purpose = optional_enum(ENTITY, &row.id, "purpose", row.purpose.as_deref());
        let category = optional_enum(ENTITY, &row.id, "category", row.category.as_deref());

        Ok(Self {
            id: row.id,
            tag: row.tag,
            name: row.name,
            gender,
            birth_date,
            entry_date,
            breed: row.breed,
            status: HealthStatus::parse(&row.status),
            ear_tag,
            owner: non_empty(row.owner),
            farm: non_empty(row.farm),
            paddock: non_empty(row.paddock),
            purpose,
            weight: non_empty(row.weight),
            category,
            created_at: row.created_at,
            user_id: row.user_id,
        })
    }
}

pub(crate) fn new_animal_row(animal: &NewAnimal, user_id: &str) -> NewAnimalRow {
    NewAnimalRow {
        tag: animal.tag.clone(),
        name: animal.name.clone(),
        gender: animal.gender.as_ref().to_owned(),
        birth_date: format_date(animal.birth_date),
        entry_date: format_date(animal.entry_date),
        breed: animal.breed.clone(),
        status: animal.status.as_str().to_owned(),
        ear_tag: animal.ear_tag.as_ref().to_owned(),
        owner: animal.owner.clone(),
        farm: animal.farm.clone(),
        purpose: animal.purpose.as_ref().to_owned(),
        weight: animal.weight.clone(),
        category: animal.category.as_ref().to_owned(),
        user_id: user_id.to_owned(),
    }
}

impl From<&AnimalUpdate> for AnimalUpdateRow {
    fn from(update: &AnimalUpdate) -> Self {
        Self {
            name: Some(update.name.clone()),
            gender: Some(update.gender.as_ref().to_owned()),
            birth_date: Some(format_date(update.birth_date)),
            entry_date: Some(format_date(update.entry_date)),
            breed: Some(update.breed.clone()),
            ear_tag: Some(update.ear_tag.as_ref().to_owned()),
            farm: Some(update.farm.clone()),
        }
    }
}

impl From<&HealthStatus> for StatusUpdateRow {
    fn from(status: &HealthStatus) -> Self {
        Self {
            status: status.as_str().to_owned(),
        }
    }
}

// ── vaccines ─────────────────────────────────────────────────────────

impl TryFrom<VaccineRow> for Vaccine {
    type Error = ConversionError;

    fn try_from(row: VaccineRow) -> Result<Self, Self::Error> {
        const ENTITY: &str = "vaccine";

        let date = required_date(ENTITY, &row.id, "date", &row.date)?;
        let next_date = optional_date(ENTITY, &row.id, "next_date", row.next_date.as_deref());

        Ok(Self {
            id: row.id,
            animal_id: row.animal_id,
            vaccine_type: row.vaccine_type,
            date,
            next_date,
            notes: non_empty(row.notes),
            created_at: row.created_at,
            animal: row.animals.map(|a| AnimalSummary {
                name: a.name,
                tag: a.tag,
            }),
        })
    }
}

pub(crate) fn new_vaccine_row(vaccine: &NewVaccine, user_id: &str) -> NewVaccineRow {
    NewVaccineRow {
        animal_id: vaccine.animal_id.clone(),
        vaccine_type: vaccine.vaccine_type.clone(),
        date: format_date(vaccine.date),
        next_date: vaccine.next_date.map(format_date),
        notes: non_empty(vaccine.notes.clone()),
        user_id: user_id.to_owned(),
    }
}

// ── activity ─────────────────────────────────────────────────────────

impl From<RecentAnimalRow> for Activity {
    fn from(row: RecentAnimalRow) -> Self {
        Self {
            id: format!("animal-{}", row.id),
            kind: ActivityKind::AnimalRegistered,
            at: row.created_at,
            animal_name: row.name,
            animal_tag: Some(row.tag),
            vaccine_type: None,
        }
    }
}

impl From<&Animal> for Activity {
    fn from(animal: &Animal) -> Self {
        Self {
            id: format!("animal-{}", animal.id),
            kind: ActivityKind::AnimalRegistered,
            at: animal.created_at,
            animal_name: animal.name.clone(),
            animal_tag: Some(animal.tag.clone()),
            vaccine_type: None,
        }
    }
}

impl From<Vaccine> for Activity {
    fn from(vaccine: Vaccine) -> Self {
        let (animal_name, animal_tag) = match vaccine.animal {
            Some(a) => (a.name, Some(a.tag)),
            None => ("-".to_owned(), None),
        };
        Self {
            id: format!("vaccine-{}", vaccine.id),
            kind: ActivityKind::VaccineApplied,
            at: vaccine.created_at,
            animal_name,
            animal_tag,
            vaccine_type: Some(vaccine.vaccine_type),
        }
    }
}

// ── reproductions ────────────────────────────────────────────────────

impl TryFrom<ReproductionRow> for Reproduction {
    type Error = ConversionError;

    fn try_from(row: ReproductionRow) -> Result<Self, Self::Error> {
        const ENTITY: &str = "reproduction";

        let service_method =
            ServiceMethod::from_str(row.service_method.trim()).map_err(|_| ConversionError {
                entity: ENTITY,
                id: row.id.clone(),
                field: "service_method",
                value: row.service_method.clone(),
            })?;
        let service_date = required_date(ENTITY, &row.id, "service_date", &row.service_date)?;
        let expected_birth_date = required_date(
            ENTITY,
            &row.id,
            "expected_birth_date",
            &row.expected_birth_date,
        )?;
        let actual_birth_date = optional_date(
            ENTITY,
            &row.id,
            "actual_birth_date",
            row.actual_birth_date.as_deref(),
        );

        Ok(Self {
            id: row.id,
            mother_id: row.mother_id,
            father_id: row.father_id,
            service_method,
            service_date,
            expected_birth_date,
            actual_birth_date,
            status: non_empty(row.status),
            notes: non_empty(row.notes),
            created_at: row.created_at,
        })
    }
}

pub(crate) fn new_reproduction_row(repro: &NewReproduction, user_id: &str) -> NewReproductionRow {
    NewReproductionRow {
        mother_id: repro.mother_id.clone(),
        father_id: repro.father_id.clone(),
        service_method: repro.service_method.as_ref().to_owned(),
        service_date: format_date(repro.service_date),
        expected_birth_date: format_date(repro.expected_birth_date),
        status: Some("pending".into()),
        notes: non_empty(repro.notes.clone()),
        user_id: user_id.to_owned(),
    }
}
