// ── Cattle table filtering ──
//
// Client-side search and single-column filtering over fetched animals.
// Matching is case-insensitive. Enumerated columns also accept either
// language's label, so `gender=macho` and `gender=male` are equivalent.

use std::str::FromStr;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::convert::format_date;
use crate::display::{DisplayAttrs, Labelled};
use crate::error::CoreError;
use crate::model::Animal;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FilterColumn {
    Tag,
    Name,
    Gender,
    BirthDate,
    EntryDate,
    Breed,
    EarTag,
    Status,
    Owner,
    Farm,
    Category,
    Purpose,
}

impl FilterColumn {
    /// Accepts `ear-tag`, `ear_tag` and `earTag` spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut normalized = String::with_capacity(raw.len() + 2);
        let mut prev_lower = false;
        for c in raw.trim().chars() {
            if c == '_' {
                normalized.push('-');
            } else if c.is_ascii_uppercase() && prev_lower {
                normalized.push('-');
                normalized.push(c.to_ascii_lowercase());
            } else {
                normalized.push(c.to_ascii_lowercase());
            }
            prev_lower = c.is_ascii_lowercase();
        }
        Self::from_str(&normalized).ok()
    }
}

/// A `column=value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: FilterColumn,
    pub value: String,
}

impl FromStr for ColumnFilter {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (column, value) = raw.split_once('=').ok_or_else(|| CoreError::Config {
            message: format!("filter '{raw}' must look like column=value"),
        })?;
        let column = FilterColumn::parse(column).ok_or_else(|| {
            let known: Vec<String> = FilterColumn::iter().map(|c| c.to_string()).collect();
            CoreError::Config {
                message: format!(
                    "unknown filter column '{column}' (expected one of: {})",
                    known.join(", ")
                ),
            }
        })?;
        Ok(Self {
            column,
            value: value.trim().to_owned(),
        })
    }
}

/// Search text plus an optional column filter. Both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CattleFilter {
    /// Matched against name, tag and breed.
    pub search: Option<String>,
    pub column: Option<ColumnFilter>,
}

impl CattleFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(str::is_empty) && self.column.is_none()
    }

    pub fn matches(&self, animal: &Animal) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let hit = contains(&animal.name, search)
                || contains(&animal.tag, search)
                || contains(&animal.breed, search);
            if !hit {
                return false;
            }
        }

        match &self.column {
            Some(filter) if !filter.value.is_empty() => column_matches(animal, filter),
            _ => true,
        }
    }

    /// Keep the matching animals, preserving order.
    pub fn apply<'a>(&self, animals: &'a [Animal]) -> Vec<&'a Animal> {
        animals.iter().filter(|a| self.matches(a)).collect()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn label_equals(attrs: DisplayAttrs, needle: &str) -> bool {
    attrs.en.eq_ignore_ascii_case(needle) || attrs.es.to_lowercase() == needle.to_lowercase()
}

/// Raw stored value contains the needle, or a label equals it.
fn enum_matches<T: Labelled + AsRef<str>>(value: Option<&T>, needle: &str) -> bool {
    value.is_some_and(|v| contains(v.as_ref(), needle) || label_equals(v.attrs(), needle))
}

fn column_matches(animal: &Animal, filter: &ColumnFilter) -> bool {
    let needle = filter.value.as_str();
    match filter.column {
        FilterColumn::Tag => contains(&animal.tag, needle),
        FilterColumn::Name => contains(&animal.name, needle),
        // Exact only: "male" is a substring of "female".
        FilterColumn::Gender => {
            animal.gender.as_ref().eq_ignore_ascii_case(needle)
                || label_equals(animal.gender.attrs(), needle)
        }
        FilterColumn::BirthDate => format_date(animal.birth_date).contains(needle),
        FilterColumn::EntryDate => animal
            .entry_date
            .is_some_and(|d| format_date(d).contains(needle)),
        FilterColumn::Breed => contains(&animal.breed, needle),
        FilterColumn::EarTag => enum_matches(animal.ear_tag.as_ref(), needle),
        FilterColumn::Status => {
            contains(animal.status.as_str(), needle)
                || (animal.status.is_known() && label_equals(animal.status.attrs(), needle))
        }
        FilterColumn::Owner => contains(animal.owner.as_deref().unwrap_or("-"), needle),
        FilterColumn::Farm => contains(animal.farm.as_deref().unwrap_or("-"), needle),
        FilterColumn::Category => enum_matches(animal.category.as_ref(), needle),
        FilterColumn::Purpose => enum_matches(animal.purpose.as_ref(), needle),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::{CattleFilter, ColumnFilter, FilterColumn};
    use crate::model::{Animal, Category, EarTagColor, Gender, HealthStatus};

    fn animal(tag: &str, name: &str, gender: Gender, status: HealthStatus) -> Animal {
        Animal {
            id: tag.to_lowercase(),
            tag: tag.into(),
            name: name.into(),
            gender,
            birth_date: NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
            entry_date: None,
            breed: "Brahman".into(),
            status,
            ear_tag: Some(EarTagColor::Sky),
            owner: None,
            farm: Some("La Esperanza".into()),
            paddock: None,
            purpose: None,
            weight: None,
            category: Some(Category::Vaquilla),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            user_id: "u1".into(),
        }
    }

    fn herd() -> Vec<Animal> {
        vec![
            animal("SND-001", "Luna", Gender::Female, HealthStatus::Healthy),
            animal("SND-002", "Tornado", Gender::Male, HealthStatus::Sick),
            animal("SND-003", "Estrella", Gender::Female, HealthStatus::Pregnant),
            animal("SND-004", "Rayo", Gender::Male, HealthStatus::Other("sold".into())),
        ]
    }

    fn by_column(raw: &str) -> CattleFilter {
        CattleFilter {
            search: None,
            column: Some(raw.parse().unwrap()),
        }
    }

    fn tags<'a>(animals: &[&'a Animal]) -> Vec<&'a str> {
        animals.iter().map(|a| a.tag.as_str()).collect()
    }

    #[test]
    fn gender_accepts_spanish_label() {
        let herd = herd();
        let hits = by_column("gender=macho").apply(&herd);
        assert_eq!(tags(&hits), ["SND-002", "SND-004"]);
        assert!(hits.iter().all(|a| a.gender == Gender::Male));
    }

    #[test]
    fn gender_male_does_not_match_female() {
        let herd = herd();
        assert_eq!(tags(&by_column("gender=MALE").apply(&herd)), ["SND-002", "SND-004"]);
        assert_eq!(tags(&by_column("gender=hembra").apply(&herd)), ["SND-001", "SND-003"]);
    }

    #[test]
    fn status_matches_raw_substring_or_label() {
        let herd = herd();
        assert_eq!(tags(&by_column("status=preñada").apply(&herd)), ["SND-003"]);
        assert_eq!(tags(&by_column("status=heal").apply(&herd)), ["SND-001"]);
        assert_eq!(tags(&by_column("status=sold").apply(&herd)), ["SND-004"]);
    }

    #[test]
    fn ear_tag_and_category_labels() {
        let herd = herd();
        assert_eq!(by_column("ear-tag=celeste").apply(&herd).len(), 4);
        assert_eq!(by_column("earTag=roja").apply(&herd).len(), 0);
        assert_eq!(by_column("category=heifer").apply(&herd).len(), 4);
    }

    #[test]
    fn missing_owner_reads_as_dash() {
        let herd = herd();
        assert_eq!(by_column("owner=-").apply(&herd).len(), 4);
        assert_eq!(by_column("farm=esperanza").apply(&herd).len(), 4);
    }

    #[test]
    fn search_and_column_combine() {
        let herd = herd();
        let filter = CattleFilter {
            search: Some("sNd-00".into()),
            column: Some("birth_date=2021-03".parse().unwrap()),
        };
        assert_eq!(filter.apply(&herd).len(), 4);

        let filter = CattleFilter {
            search: Some("luna".into()),
            column: Some("gender=male".parse().unwrap()),
        };
        assert!(filter.apply(&herd).is_empty());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let herd = herd();
        let filter = CattleFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&herd).len(), herd.len());
    }

    #[test]
    fn column_names_accept_several_spellings() {
        assert_eq!(FilterColumn::parse("entry_date"), Some(FilterColumn::EntryDate));
        assert_eq!(FilterColumn::parse("entryDate"), Some(FilterColumn::EntryDate));
        assert_eq!(FilterColumn::parse("Entry-Date"), Some(FilterColumn::EntryDate));
        assert_eq!(FilterColumn::parse("weight"), None);
        assert!("weight=400".parse::<ColumnFilter>().is_err());
        assert!("gender".parse::<ColumnFilter>().is_err());
    }
}
