use super::{Form, Submit, ValidationErrors, choice, text};
use crate::access::DataAccess;
use crate::error::CoreError;
use crate::model::{Animal, HealthStatus};
use crate::session::Session;

/// Changes an animal's health status and nothing else.
#[derive(Debug, Clone)]
pub struct HealthForm {
    pub animal_id: String,
    pub status: String,
    initial: (String, String),
}

impl HealthForm {
    /// Empty form; the animal must be chosen before submitting.
    pub fn new() -> Self {
        Self::prefilled(String::new(), HealthStatus::Healthy.to_string())
    }

    /// Pre-populated with the animal's current status.
    pub fn from_animal(animal: &Animal) -> Self {
        Self::prefilled(animal.id.clone(), animal.status.to_string())
    }

    pub async fn load(access: &DataAccess, session: &Session, id: &str) -> Result<Self, CoreError> {
        access
            .resolve_animal(session, id)
            .await?
            .map(|animal| Self::from_animal(&animal))
            .ok_or_else(|| CoreError::not_found("Animal", id))
    }

    fn prefilled(animal_id: String, status: String) -> Self {
        Self {
            initial: (animal_id.clone(), status.clone()),
            animal_id,
            status,
        }
    }
}

impl Default for HealthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for HealthForm {
    type Output = (String, HealthStatus);

    fn validate(&self) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let animal_id = text(&mut errors, "animal_id", &self.animal_id, 1);
        let status = choice(&mut errors, "status", &self.status, HealthStatus::known());

        match (animal_id, status) {
            (Some(id), Some(status)) => Ok((id, status)),
            _ => Err(errors),
        }
    }

    fn reset(&mut self) {
        let (animal_id, status) = self.initial.clone();
        self.animal_id = animal_id;
        self.status = status;
    }
}

impl Submit for HealthForm {
    type Saved = Animal;

    async fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        (id, status): &Self::Output,
    ) -> Result<Animal, CoreError> {
        access.set_animal_status(session, id, status).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::HealthForm;
    use crate::forms::Form;
    use crate::model::HealthStatus;

    #[test]
    fn requires_an_animal_and_a_known_status() {
        let mut form = HealthForm::new();
        form.status = "quarantine".into();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);

        form.animal_id = "a1".into();
        form.status = "Enfermo".into();
        assert_eq!(
            form.validate().unwrap(),
            ("a1".to_owned(), HealthStatus::Sick)
        );

        form.reset();
        assert!(form.animal_id.is_empty());
        assert_eq!(form.status, "healthy");
    }
}
