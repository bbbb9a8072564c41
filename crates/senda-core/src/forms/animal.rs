use chrono::NaiveDate;
use strum::IntoEnumIterator;

use super::{Form, Submit, ValidationErrors, choice, date, text};
use crate::access::DataAccess;
use crate::convert::format_date;
use crate::error::CoreError;
use crate::model::{
    Animal, AnimalUpdate, Category, EarTagColor, Gender, HealthStatus, NewAnimal, Purpose,
};
use crate::session::Session;

// ── New animal ───────────────────────────────────────────────────────

/// Raw input for a new animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalValues {
    pub tag: String,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub entry_date: String,
    pub breed: String,
    pub status: String,
    pub ear_tag: String,
    pub weight: String,
    pub owner: String,
    pub farm: String,
    pub purpose: String,
    pub category: String,
}

impl AnimalValues {
    pub fn defaults(today: NaiveDate) -> Self {
        let today = format_date(today);
        Self {
            tag: String::new(),
            name: String::new(),
            gender: Gender::Male.to_string(),
            birth_date: today.clone(),
            entry_date: today,
            breed: String::new(),
            status: HealthStatus::Healthy.to_string(),
            ear_tag: EarTagColor::Red.to_string(),
            weight: String::new(),
            owner: String::new(),
            farm: String::new(),
            purpose: Purpose::Fattening.to_string(),
            category: Category::Vaca.to_string(),
        }
    }
}

/// Registers a new animal.
#[derive(Debug, Clone)]
pub struct AnimalForm {
    pub values: AnimalValues,
    initial: AnimalValues,
}

impl AnimalForm {
    pub fn new(today: NaiveDate) -> Self {
        let initial = AnimalValues::defaults(today);
        Self {
            values: initial.clone(),
            initial,
        }
    }
}

fn weight(errors: &mut ValidationErrors, raw: &str) -> Option<String> {
    let value = text(errors, "weight", raw, 1)?;
    match value.replace(',', ".").parse::<f64>() {
        Ok(kg) if kg.is_finite() && kg > 0.0 => Some(value),
        _ => {
            errors.push("weight", format!("'{value}' is not a positive number of kilograms"));
            None
        }
    }
}

impl Form for AnimalForm {
    type Output = NewAnimal;

    fn validate(&self) -> Result<NewAnimal, ValidationErrors> {
        let v = &self.values;
        let mut errors = ValidationErrors::new();

        let tag = text(&mut errors, "tag", &v.tag, 3);
        let name = text(&mut errors, "name", &v.name, 2);
        let gender = choice(&mut errors, "gender", &v.gender, Gender::iter());
        let birth_date = date(&mut errors, "birth_date", &v.birth_date);
        let entry_date = date(&mut errors, "entry_date", &v.entry_date);
        let breed = text(&mut errors, "breed", &v.breed, 2);
        let status = choice(&mut errors, "status", &v.status, HealthStatus::known());
        let ear_tag = choice(&mut errors, "ear_tag", &v.ear_tag, EarTagColor::iter());
        let weight = weight(&mut errors, &v.weight);
        let owner = text(&mut errors, "owner", &v.owner, 2);
        let farm = text(&mut errors, "farm", &v.farm, 2);
        let purpose = choice(&mut errors, "purpose", &v.purpose, Purpose::iter());
        let category = choice(&mut errors, "category", &v.category, Category::iter());

        match (
            tag, name, gender, birth_date, entry_date, breed, status, ear_tag, weight, owner, farm,
            purpose, category,
        ) {
            (
                Some(tag),
                Some(name),
                Some(gender),
                Some(birth_date),
                Some(entry_date),
                Some(breed),
                Some(status),
                Some(ear_tag),
                Some(weight),
                Some(owner),
                Some(farm),
                Some(purpose),
                Some(category),
            ) if errors.is_empty() => Ok(NewAnimal {
                tag,
                name,
                gender,
                birth_date,
                entry_date,
                breed,
                status,
                ear_tag,
                owner,
                farm,
                purpose,
                weight,
                category,
            }),
            _ => Err(errors),
        }
    }

    fn reset(&mut self) {
        self.values = self.initial.clone();
    }
}

impl Submit for AnimalForm {
    type Saved = Animal;

    async fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        payload: &NewAnimal,
    ) -> Result<Animal, CoreError> {
        access.create_animal(session, payload).await
    }
}

// ── Edit animal ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditAnimalValues {
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub entry_date: String,
    pub breed: String,
    pub ear_tag: String,
    pub farm: String,
}

/// Edits an existing animal, pre-populated from its stored record.
#[derive(Debug, Clone)]
pub struct EditAnimalForm {
    animal_id: String,
    pub values: EditAnimalValues,
    initial: EditAnimalValues,
}

impl EditAnimalForm {
    /// Missing optional columns prefill as empty input.
    pub fn from_animal(animal: &Animal) -> Self {
        let initial = EditAnimalValues {
            name: animal.name.clone(),
            gender: animal.gender.to_string(),
            birth_date: format_date(animal.birth_date),
            entry_date: animal.entry_date.map(format_date).unwrap_or_default(),
            breed: animal.breed.clone(),
            ear_tag: animal.ear_tag.map(|t| t.to_string()).unwrap_or_default(),
            farm: animal.farm.clone().unwrap_or_default(),
        };
        Self {
            animal_id: animal.id.clone(),
            values: initial.clone(),
            initial,
        }
    }

    /// Fetch the target and pre-populate; `NotFound` if it is gone.
    pub async fn load(access: &DataAccess, session: &Session, id: &str) -> Result<Self, CoreError> {
        access
            .resolve_animal(session, id)
            .await?
            .map(|animal| Self::from_animal(&animal))
            .ok_or_else(|| CoreError::not_found("Animal", id))
    }

    pub fn animal_id(&self) -> &str {
        &self.animal_id
    }
}

impl Form for EditAnimalForm {
    type Output = AnimalUpdate;

    fn validate(&self) -> Result<AnimalUpdate, ValidationErrors> {
        let v = &self.values;
        let mut errors = ValidationErrors::new();

        let name = text(&mut errors, "name", &v.name, 2);
        let gender = choice(&mut errors, "gender", &v.gender, Gender::iter());
        let birth_date = date(&mut errors, "birth_date", &v.birth_date);
        let entry_date = date(&mut errors, "entry_date", &v.entry_date);
        let breed = text(&mut errors, "breed", &v.breed, 2);
        let ear_tag = choice(&mut errors, "ear_tag", &v.ear_tag, EarTagColor::iter());
        let farm = text(&mut errors, "farm", &v.farm, 2);

        match (name, gender, birth_date, entry_date, breed, ear_tag, farm) {
            (
                Some(name),
                Some(gender),
                Some(birth_date),
                Some(entry_date),
                Some(breed),
                Some(ear_tag),
                Some(farm),
            ) if errors.is_empty() => Ok(AnimalUpdate {
                name,
                gender,
                birth_date,
                entry_date,
                breed,
                ear_tag,
                farm,
            }),
            _ => Err(errors),
        }
    }

    fn reset(&mut self) {
        self.values = self.initial.clone();
    }
}

impl Submit for EditAnimalForm {
    type Saved = Animal;

    async fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        payload: &AnimalUpdate,
    ) -> Result<Animal, CoreError> {
        access.update_animal(session, &self.animal_id, payload).await
    }
}
