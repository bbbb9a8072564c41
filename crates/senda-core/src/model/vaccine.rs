use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Name and tag of the animal a record refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimalSummary {
    pub name: String,
    pub tag: String,
}

/// A vaccination entry. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vaccine {
    pub id: String,
    pub animal_id: String,
    pub vaccine_type: String,
    pub date: NaiveDate,
    pub next_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present when the query embedded `animals(name,tag)`.
    pub animal: Option<AnimalSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVaccine {
    pub animal_id: String,
    pub vaccine_type: String,
    pub date: NaiveDate,
    pub next_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
