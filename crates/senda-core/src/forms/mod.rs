// ── Form controllers ──
//
// Each form holds raw user input, validates it locally into a typed payload,
// and writes it through `DataAccess` in a single call. On success the form
// resets and the caller's completion callback runs; on failure the input is
// kept and the error is returned.

mod animal;
mod health;
mod reproduction;
mod vaccine;

use std::fmt;
use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;

use crate::access::DataAccess;
use crate::convert::parse_date;
use crate::display::Labelled;
use crate::error::CoreError;
use crate::session::Session;

pub use animal::{AnimalForm, AnimalValues, EditAnimalForm, EditAnimalValues};
pub use health::HealthForm;
pub use reproduction::{AnimalOption, ReproductionForm};
pub use vaccine::VaccineForm;

// ── Validation errors ────────────────────────────────────────────────

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field that failed, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }

    /// `Ok(value)` when nothing failed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ── Field checks ─────────────────────────────────────────────────────

/// Trimmed input with at least `min` characters.
pub(crate) fn text(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    min: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, "is required");
        None
    } else if value.chars().count() < min {
        errors.push(field, format!("must be at least {min} characters"));
        None
    } else {
        Some(value.to_owned())
    }
}

pub(crate) fn date(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        errors.push(field, "is required");
        return None;
    }
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.push(field, format!("'{}' is not a YYYY-MM-DD date", raw.trim()));
    }
    parsed
}

pub(crate) fn optional_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<NaiveDate> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => date(errors, field, raw),
        None => None,
    }
}

/// One of `candidates`, matched by stored value or either language's label.
pub(crate) fn choice<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    candidates: impl IntoIterator<Item = T>,
) -> Option<T>
where
    T: Labelled + AsRef<str>,
{
    let needle = raw.trim().to_lowercase();
    let candidates: Vec<T> = candidates.into_iter().collect();
    let allowed: Vec<String> = candidates.iter().map(|c| c.as_ref().to_owned()).collect();

    let found = candidates.into_iter().find(|c| {
        let attrs = c.attrs();
        c.as_ref().to_lowercase() == needle
            || attrs.en.to_lowercase() == needle
            || attrs.es.to_lowercase() == needle
    });
    if found.is_none() {
        errors.push(
            field,
            format!("must be one of: {} (got '{}')", allowed.join(", "), raw.trim()),
        );
    }
    found
}

// ── Form contract ────────────────────────────────────────────────────

/// Local validation plus reset.
pub trait Form {
    /// The typed payload a valid form produces.
    type Output;

    fn validate(&self) -> Result<Self::Output, ValidationErrors>;

    /// Restore the initial (default or pre-populated) values.
    fn reset(&mut self);
}

/// A form that can persist its payload.
pub trait Submit: Form {
    type Saved;

    fn write(
        &self,
        access: &DataAccess,
        session: &Session,
        payload: &Self::Output,
    ) -> impl Future<Output = Result<Self::Saved, CoreError>> + Send;
}

/// Validate, write once, then reset and notify.
///
/// Validation failures never reach the backend. A backend failure leaves
/// the form untouched so the user can correct and resubmit.
pub async fn submit<F, C>(
    form: &mut F,
    access: &DataAccess,
    session: &Session,
    on_success: C,
) -> Result<F::Saved, CoreError>
where
    F: Submit,
    C: FnOnce(&F::Saved),
{
    let payload = form.validate()?;
    let saved = form.write(access, session, &payload).await?;
    form.reset();
    on_success(&saved);
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::{ValidationErrors, choice, text};
    use crate::model::{EarTagColor, HealthStatus};

    #[test]
    fn display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("tag", "must be at least 3 characters");
        errors.push("weight", "is required");
        assert_eq!(
            errors.to_string(),
            "Validation failed: tag must be at least 3 characters; weight is required"
        );
        assert_eq!(errors.len(), 2);
        assert!(errors.field("weight").is_some());
    }

    #[test]
    fn text_counts_characters_not_bytes() {
        let mut errors = ValidationErrors::new();
        assert_eq!(text(&mut errors, "name", " Ñu ", 2).as_deref(), Some("Ñu"));
        assert_eq!(text(&mut errors, "name", "Ñ", 2), None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn choice_accepts_values_and_labels() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            choice(&mut errors, "ear_tag", "Celeste", [EarTagColor::Red, EarTagColor::Sky]),
            Some(EarTagColor::Sky)
        );
        assert_eq!(
            choice(&mut errors, "status", "SICK", HealthStatus::known()),
            Some(HealthStatus::Sick)
        );
        assert!(errors.is_empty());

        assert_eq!(choice(&mut errors, "status", "dead", HealthStatus::known()), None);
        assert_eq!(
            errors.field("status").map(|e| e.message.as_str()),
            Some("must be one of: healthy, sick, pregnant (got 'dead')")
        );
    }
}
