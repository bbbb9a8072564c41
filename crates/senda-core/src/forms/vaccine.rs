use chrono::NaiveDate;

use super::{Form, Submit, ValidationErrors, date, optional_date, text};
use crate::access::DataAccess;
use crate::convert::format_date;
use crate::error::CoreError;
use crate::model::{NewVaccine, Vaccine};
use crate::session::Session;

/// Records a vaccine application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccineForm {
    pub animal_id: String,
    pub vaccine_type: String,
    pub date: String,
    pub next_date: Option<String>,
    pub notes: Option<String>,
    today: NaiveDate,
}

impl VaccineForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            animal_id: String::new(),
            vaccine_type: String::new(),
            date: format_date(today),
            next_date: None,
            notes: None,
            today,
        }
    }
}

impl Form for VaccineForm {
    type Output = NewVaccine;

    fn validate(&self) -> Result<NewVaccine, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let animal_id = text(&mut errors, "animal_id", &self.animal_id, 1);
        let vaccine_type = text(&mut errors, "vaccine_type", &self.vaccine_type, 2);
        let applied = date(&mut errors, "date", &self.date);
        let next_date = optional_date(&mut errors, "next_date", self.next_date.as_deref());

        if applied.zip(next_date).is_some_and(|(a, n)| n < a) {
            errors.push("next_date", "must not be before the application date");
        }

        match (animal_id, vaccine_type, applied) {
            (Some(animal_id), Some(vaccine_type), Some(date)) if errors.is_empty() => {
                Ok(NewVaccine {
                    animal_id,
                    vaccine_type,
                    date,
                    next_date,
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
        *self = Self::new(self.today);
    }
}

impl Submit for VaccineForm {
    type Saved = Vaccine;

    async fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        payload: &NewVaccine,
    ) -> Result<Vaccine, CoreError> {
        access.create_vaccine(session, payload).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::VaccineForm;
    use crate::forms::Form;

    fn form() -> VaccineForm {
        let mut form = VaccineForm::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        form.animal_id = "a1".into();
        form.vaccine_type = "Aftosa".into();
        form
    }

    #[test]
    fn blank_notes_and_next_date_become_none() {
        let mut form = form();
        form.next_date = Some("  ".into());
        form.notes = Some(String::new());

        let vaccine = form.validate().unwrap();
        assert_eq!(vaccine.next_date, None);
        assert_eq!(vaccine.notes, None);
        assert_eq!(vaccine.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn next_date_may_not_precede_application() {
        let mut form = form();
        form.next_date = Some("2024-06-14".into());
        let errors = form.validate().unwrap_err();
        assert!(errors.field("next_date").is_some());

        form.next_date = Some("2024-06-15".into());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn short_vaccine_type_is_rejected() {
        let mut form = form();
        form.vaccine_type = "A".into();
        form.date = "15/06/2024".into();
        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["vaccine_type", "date"]);
    }
}
