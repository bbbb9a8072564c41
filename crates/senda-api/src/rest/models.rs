// Wire types for the three herd tables.
//
// Rows mirror the backend columns as-is: dates stay strings and enums stay
// free text. Typing and validation happen in `senda-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── animals ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimalRow {
    pub id: String,
    pub tag: String,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub breed: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ear_tag: Option<String>,
    #[serde(default)]
    pub entry_date: Option<String>,
    #[serde(default)]
    pub farm: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub paddock: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    /// Free-form kilograms. Some projects store this as text, others as numeric.
    #[serde(default, deserialize_with = "string_or_number")]
    pub weight: Option<String>,
}

/// Lightweight projection used by the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecentAnimalRow {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnimalRow {
    pub tag: String,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub entry_date: String,
    pub breed: String,
    pub status: String,
    pub ear_tag: String,
    pub owner: String,
    pub farm: String,
    pub purpose: String,
    pub weight: String,
    pub category: String,
    pub user_id: String,
}

/// Partial update from the edit form. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimalUpdateRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ear_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdateRow {
    pub status: String,
}

// ── vaccines ─────────────────────────────────────────────────────────

/// Name and tag of the animal embedded via `animals(name,tag)`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimalRef {
    pub name: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VaccineRow {
    pub id: String,
    pub animal_id: String,
    pub vaccine_type: String,
    pub date: String,
    #[serde(default)]
    pub next_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub animals: Option<AnimalRef>,
}

/// `next_date` and `notes` serialize as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVaccineRow {
    pub animal_id: String,
    pub vaccine_type: String,
    pub date: String,
    pub next_date: Option<String>,
    pub notes: Option<String>,
    pub user_id: String,
}

// ── reproductions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReproductionRow {
    pub id: String,
    pub mother_id: String,
    pub father_id: String,
    pub service_method: String,
    pub service_date: String,
    pub expected_birth_date: String,
    #[serde(default)]
    pub actual_birth_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReproductionRow {
    pub mother_id: String,
    pub father_id: String,
    pub service_method: String,
    pub service_date: String,
    pub expected_birth_date: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub user_id: String,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::{AnimalRow, NewVaccineRow, VaccineRow};

    fn animal_json(weight: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "a1",
            "tag": "SND-001",
            "name": "Luna",
            "gender": "female",
            "birth_date": "2021-03-04",
            "breed": "Brahman",
            "status": "healthy",
            "created_at": "2024-06-15T10:30:00.123456+00:00",
            "user_id": "u1",
            "weight": weight
        })
    }

    #[test]
    fn weight_accepts_text_and_numbers() {
        let text: AnimalRow = serde_json::from_value(animal_json(json!("412.5"))).unwrap();
        let number: AnimalRow = serde_json::from_value(animal_json(json!(412.5))).unwrap();
        let null: AnimalRow = serde_json::from_value(animal_json(json!(null))).unwrap();

        assert_eq!(text.weight.as_deref(), Some("412.5"));
        assert_eq!(number.weight.as_deref(), Some("412.5"));
        assert_eq!(null.weight, None);
        assert_eq!(text.owner, None);
    }

    #[test]
    fn vaccine_row_reads_embedded_animal() {
        let row: VaccineRow = serde_json::from_value(json!({
            "id": "v1",
            "animal_id": "a1",
            "vaccine_type": "Aftosa",
            "date": "2024-06-01",
            "next_date": null,
            "created_at": "2024-06-01T08:00:00Z",
            "animals": { "name": "Luna", "tag": "SND-001" }
        }))
        .unwrap();

        assert_eq!(row.animals.unwrap().tag, "SND-001");
        assert_eq!(row.next_date, None);
        assert_eq!(row.user_id, None);
    }

    #[test]
    fn new_vaccine_serializes_missing_optionals_as_null() {
        let row = NewVaccineRow {
            animal_id: "a1".into(),
            vaccine_type: "Aftosa".into(),
            date: "2024-06-01".into(),
            next_date: None,
            notes: None,
            user_id: "u1".into(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert!(value["next_date"].is_null());
        assert!(value["notes"].is_null());
        assert_eq!(value["user_id"], "u1");
    }
}
