use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::display::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
    AnimalRegistered,
    VaccineApplied,
}

/// Something that happened to the herd, keyed by the record's creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// `animal-<id>` or `vaccine-<id>`.
    pub id: String,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
    pub animal_name: String,
    pub animal_tag: Option<String>,
    pub vaccine_type: Option<String>,
}

impl Activity {
    pub fn describe(&self, locale: Locale) -> String {
        let name = &self.animal_name;
        let tag = self
            .animal_tag
            .as_deref()
            .map(|t| format!(" ({t})"))
            .unwrap_or_default();
        let vaccine = self.vaccine_type.as_deref().unwrap_or("-");
        match (self.kind, locale) {
            (ActivityKind::AnimalRegistered, Locale::En) => {
                format!("New animal registered: {name}{tag}")
            }
            (ActivityKind::AnimalRegistered, Locale::Es) => {
                format!("Nuevo animal registrado: {name}{tag}")
            }
            (ActivityKind::VaccineApplied, Locale::En) => {
                format!("Vaccine {vaccine} applied: {name}")
            }
            (ActivityKind::VaccineApplied, Locale::Es) => {
                format!("Vacuna {vaccine} aplicada: {name}")
            }
        }
    }
}
