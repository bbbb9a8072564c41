use chrono::NaiveDate;
use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::display::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Vaccination,
    BirthEstimate,
    Checkup,
}

/// An upcoming (or overdue) herd event derived from the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub date: NaiveDate,
    pub animal_id: String,
    pub animal_name: String,
    /// Vaccine type for vaccination events.
    pub detail: Option<String>,
    /// `true` when the date comes from a model rather than a record.
    pub estimated: bool,
}

impl Event {
    pub fn describe(&self, locale: Locale) -> String {
        let name = &self.animal_name;
        match (self.kind, locale) {
            (EventKind::Vaccination, Locale::En) => format!(
                "{} vaccination due for {name}",
                self.detail.as_deref().unwrap_or("Scheduled")
            ),
            (EventKind::Vaccination, Locale::Es) => format!(
                "Vacuna {} para {name}",
                self.detail.as_deref().unwrap_or("programada")
            ),
            (EventKind::BirthEstimate, Locale::En) if self.estimated => {
                format!("Estimated calving for {name}")
            }
            (EventKind::BirthEstimate, Locale::En) => format!("Expected calving for {name}"),
            (EventKind::BirthEstimate, Locale::Es) if self.estimated => {
                format!("Parto estimado de {name}")
            }
            (EventKind::BirthEstimate, Locale::Es) => format!("Parto esperado de {name}"),
            (EventKind::Checkup, Locale::En) => format!("Routine checkup for {name}"),
            (EventKind::Checkup, Locale::Es) => format!("Revisión de rutina para {name}"),
        }
    }
}
