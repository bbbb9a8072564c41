use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::access::DataAccess;
use crate::display::Locale;
use crate::error::CoreError;
use crate::model::{Animal, Vaccine};
use crate::session::Session;

/// Whole-unit age shown on the carnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum WholeAge {
    Years(u32),
    /// Under one year: elapsed days / 30.
    Months(u32),
}

impl WholeAge {
    pub fn between(birth_date: NaiveDate, today: NaiveDate) -> Self {
        let mut years = today.year() - birth_date.year();
        if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
            years -= 1;
        }
        if years >= 1 {
            Self::Years(u32::try_from(years).unwrap_or(0))
        } else {
            let days = (today - birth_date).num_days().max(0);
            Self::Months(u32::try_from(days / 30).unwrap_or(0))
        }
    }

    pub fn label(self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Years(1), Locale::En) => "1 year".into(),
            (Self::Years(n), Locale::En) => format!("{n} years"),
            (Self::Years(1), Locale::Es) => "1 año".into(),
            (Self::Years(n), Locale::Es) => format!("{n} años"),
            (Self::Months(1), Locale::En) => "1 month".into(),
            (Self::Months(n), Locale::En) => format!("{n} months"),
            (Self::Months(1), Locale::Es) => "1 mes".into(),
            (Self::Months(n), Locale::Es) => format!("{n} meses"),
        }
    }
}

/// Profile plus vaccination history, latest application first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalCard {
    pub animal: Animal,
    pub age: WholeAge,
    pub vaccines: Vec<Vaccine>,
}

/// The carnet lookup result. A missing animal is a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Carnet {
    Found(Box<AnimalCard>),
    NotFound { query: String },
}

impl Carnet {
    pub fn build(animal: Animal, mut vaccines: Vec<Vaccine>, today: NaiveDate) -> Self {
        vaccines.sort_by(|a, b| b.date.cmp(&a.date));
        Self::Found(Box::new(AnimalCard {
            age: WholeAge::between(animal.birth_date, today),
            animal,
            vaccines,
        }))
    }

    /// Look the animal up by id or tag, then fetch its history.
    pub async fn load(
        access: &DataAccess,
        session: &Session,
        id_or_tag: &str,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let Some(animal) = access.resolve_animal(session, id_or_tag).await? else {
            return Ok(Self::NotFound {
                query: id_or_tag.to_owned(),
            });
        };
        let vaccines = access.list_vaccines_for_animal(session, &animal.id).await?;
        Ok(Self::build(animal, vaccines, today))
    }
}
