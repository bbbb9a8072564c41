use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator;

use super::{Form, Submit, ValidationErrors, choice, date};
use crate::access::{AnimalQuery, DataAccess};
use crate::convert::{format_date, parse_date};
use crate::error::CoreError;
use crate::model::{
    Animal, Gender, NewReproduction, Reproduction, ServiceMethod, expected_birth_date,
};
use crate::session::Session;

/// A selectable parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimalOption {
    pub id: String,
    pub name: String,
    pub tag: String,
}

impl From<&Animal> for AnimalOption {
    fn from(animal: &Animal) -> Self {
        Self {
            id: animal.id.clone(),
            name: animal.name.clone(),
            tag: animal.tag.clone(),
        }
    }
}

/// Records a breeding service.
///
/// The expected birth date is derived: every call to
/// [`set_service_date`](Self::set_service_date) recomputes it.
#[derive(Debug, Clone)]
pub struct ReproductionForm {
    /// Mother id or tag.
    pub mother: String,
    /// Father id or tag.
    pub father: String,
    pub service_method: String,
    pub notes: Option<String>,
    service_date: String,
    expected_birth_date: Option<NaiveDate>,
    mothers: Vec<AnimalOption>,
    fathers: Vec<AnimalOption>,
    today: NaiveDate,
}

impl ReproductionForm {
    pub fn with_candidates(
        today: NaiveDate,
        mothers: Vec<AnimalOption>,
        fathers: Vec<AnimalOption>,
    ) -> Self {
        let mut form = Self {
            mother: String::new(),
            father: String::new(),
            service_method: ServiceMethod::Natural.to_string(),
            notes: None,
            service_date: String::new(),
            expected_birth_date: None,
            mothers,
            fathers,
            today,
        };
        form.set_service_date(format_date(today));
        form
    }

    /// Fetch the user's females and males as parent candidates.
    pub async fn load(
        access: &DataAccess,
        session: &Session,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let female = AnimalQuery::gender(Gender::Female);
        let male = AnimalQuery::gender(Gender::Male);
        let (females, males) = tokio::try_join!(
            access.list_animals(session, &female),
            access.list_animals(session, &male),
        )?;
        Ok(Self::with_candidates(
            today,
            females.iter().map(AnimalOption::from).collect(),
            males.iter().map(AnimalOption::from).collect(),
        ))
    }

    pub fn set_service_date(&mut self, raw: impl Into<String>) {
        self.service_date = raw.into();
        self.expected_birth_date = parse_date(&self.service_date).map(expected_birth_date);
    }

    pub fn service_date(&self) -> &str {
        &self.service_date
    }

    /// `None` while the service date does not parse.
    pub fn expected_birth_date(&self) -> Option<NaiveDate> {
        self.expected_birth_date
    }

    pub fn mothers(&self) -> &[AnimalOption] {
        &self.mothers
    }

    pub fn fathers(&self) -> &[AnimalOption] {
        &self.fathers
    }
}

fn pick_parent(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    candidates: &[AnimalOption],
    requirement: &str,
) -> Option<String> {
    let needle = raw.trim();
    if needle.is_empty() {
        errors.push(field, "is required");
        return None;
    }
    let found = candidates
        .iter()
        .find(|c| c.id == needle || c.tag.eq_ignore_ascii_case(needle));
    if found.is_none() {
        errors.push(field, format!("'{needle}' is not {requirement}"));
    }
    found.map(|c| c.id.clone())
}

impl Form for ReproductionForm {
    type Output = NewReproduction;

    fn validate(&self) -> Result<NewReproduction, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mother_id = pick_parent(
            &mut errors,
            "mother",
            &self.mother,
            &self.mothers,
            "a female animal",
        );
        let father_id = pick_parent(
            &mut errors,
            "father",
            &self.father,
            &self.fathers,
            "a male animal",
        );
        let service_method =
            choice(&mut errors, "service_method", &self.service_method, ServiceMethod::iter());
        let service_date = date(&mut errors, "service_date", &self.service_date);

        match (mother_id, father_id, service_method, service_date) {
            (Some(mother_id), Some(father_id), Some(service_method), Some(service_date)) => {
                Ok(NewReproduction {
                    mother_id,
                    father_id,
                    service_method,
                    service_date,
                    expected_birth_date: expected_birth_date(service_date),
                    notes: self
                        .notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_owned),
                })
            }
            _ => Err(errors),
        }
    }

    fn reset(&mut self) {
        let mothers = std::mem::take(&mut self.mothers);
        let fathers = std::mem::take(&mut self.fathers);
        *self = Self::with_candidates(self.today, mothers, fathers);
    }
}

impl Submit for ReproductionForm {
    type Saved = Reproduction;

    async fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        payload: &NewReproduction,
    ) -> Result<Reproduction, CoreError> {
        access.create_reproduction(session, payload).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Days, NaiveDate};
    use pretty_assertions::assert_eq;

    use super::{AnimalOption, ReproductionForm};
    use crate::forms::Form;
    use crate::model::{GESTATION_DAYS, ServiceMethod};

    fn option(id: &str, tag: &str) -> AnimalOption {
        AnimalOption {
            id: id.into(),
            name: format!("Animal {tag}"),
            tag: tag.into(),
        }
    }

    fn form() -> ReproductionForm {
        ReproductionForm::with_candidates(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            vec![option("f1", "SND-001")],
            vec![option("m1", "SND-002")],
        )
    }

    #[test]
    fn expected_date_tracks_every_service_date_change() {
        let mut form = form();
        assert_eq!(form.expected_birth_date(), NaiveDate::from_ymd_opt(2025, 3, 20));

        let mut day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        for _ in 0..60 {
            form.set_service_date(day.format("%Y-%m-%d").to_string());
            assert_eq!(
                form.expected_birth_date(),
                day.checked_add_days(Days::new(GESTATION_DAYS))
            );
            day = day.succ_opt().unwrap();
        }

        form.set_service_date("garbage");
        assert_eq!(form.expected_birth_date(), None);
    }

    #[test]
    fn parents_must_have_the_right_gender() {
        let mut form = form();
        form.mother = "SND-002".into();
        form.father = "snd-001".into();

        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.field("mother").unwrap().message,
            "'SND-002' is not a female animal"
        );
        assert!(errors.field("father").is_some());
    }

    #[test]
    fn valid_service_resolves_tags_to_ids() {
        let mut form = form();
        form.mother = "snd-001".into();
        form.father = "m1".into();
        form.service_method = "Inseminación artificial".into();
        form.set_service_date("2024-02-01");

        let service = form.validate().unwrap();
        assert_eq!(service.mother_id, "f1");
        assert_eq!(service.father_id, "m1");
        assert_eq!(service.service_method, ServiceMethod::Artificial);
        assert_eq!(
            service.expected_birth_date,
            NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
        );

        form.reset();
        assert!(form.mother.is_empty());
        assert_eq!(form.service_date(), "2024-06-15");
        assert_eq!(form.mothers().len(), 1);
    }
}
