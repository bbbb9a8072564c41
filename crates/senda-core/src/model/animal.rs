// ── Animal domain types ──
//
// Typed view of an `animals` row. Enumerated columns are parsed into
// enums; the health status keeps unrecognised values verbatim.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
}

/// Health status of an animal.
///
/// The backend column is free text, so anything outside the three known
/// values is carried through as [`HealthStatus::Other`] instead of being
/// dropped or coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HealthStatus {
    Healthy,
    Sick,
    Pregnant,
    Other(String),
}

impl HealthStatus {
    /// The statuses the forms accept, in display order.
    pub fn known() -> [Self; 3] {
        [Self::Healthy, Self::Sick, Self::Pregnant]
    }

    /// Lenient parse used for stored rows.
    pub fn parse(raw: &str) -> Self {
        Self::from_known(raw).unwrap_or_else(|| Self::Other(raw.to_owned()))
    }

    /// Strict parse used for user input.
    pub fn from_known(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "healthy" => Some(Self::Healthy),
            "sick" => Some(Self::Sick),
            "pregnant" => Some(Self::Pregnant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Healthy => "healthy",
            Self::Sick => "sick",
            Self::Pregnant => "pregnant",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for HealthStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for HealthStatus {
    fn from(raw: String) -> Self {
        match Self::from_known(&raw) {
            Some(known) => known,
            None => Self::Other(raw),
        }
    }
}

impl From<HealthStatus> for String {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// Colour of the physical ear tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EarTagColor {
    Red,
    Green,
    Yellow,
    Sky,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Purpose {
    Fattening,
    Breeding,
    Sale,
}

/// Herd category. Stored values are the Spanish ranching terms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    Vaca,
    Vaquilla,
    Novillo,
    Toro,
    DesmamanteMacho,
    DesmamanteHembra,
    Ternero,
    Bueye,
}

/// An animal record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animal {
    pub id: String,
    pub tag: String,
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub entry_date: Option<NaiveDate>,
    pub breed: String,
    pub status: HealthStatus,
    pub ear_tag: Option<EarTagColor>,
    pub owner: Option<String>,
    pub farm: Option<String>,
    pub paddock: Option<String>,
    pub purpose: Option<Purpose>,
    /// Kilograms as entered; see [`Animal::weight_kg`].
    pub weight: Option<String>,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

impl Animal {
    /// Parsed weight, if the stored text is a finite number.
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight
            .as_deref()
            .and_then(|w| w.trim().replace(',', ".").parse::<f64>().ok())
            .filter(|w| w.is_finite())
    }

    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }
}

/// A validated animal ready to be inserted. `user_id` is stamped on write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnimal {
    pub tag: String,
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub breed: String,
    pub status: HealthStatus,
    pub ear_tag: EarTagColor,
    pub owner: String,
    pub farm: String,
    pub purpose: Purpose,
    pub weight: String,
    pub category: Category,
}

/// Fields the edit form may change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalUpdate {
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub breed: String,
    pub ear_tag: EarTagColor,
    pub farm: String,
}
