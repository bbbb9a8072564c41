use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Days from service to expected birth.
pub const GESTATION_DAYS: u64 = 278;

/// Expected birth date for a service on `service_date`.
pub fn expected_birth_date(service_date: NaiveDate) -> NaiveDate {
    service_date
        .checked_add_days(Days::new(GESTATION_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceMethod {
    Natural,
    Artificial,
}

/// A breeding service and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reproduction {
    pub id: String,
    pub mother_id: String,
    pub father_id: String,
    pub service_method: ServiceMethod,
    pub service_date: NaiveDate,
    pub expected_birth_date: NaiveDate,
    pub actual_birth_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reproduction {
    /// Still waiting on the birth.
    pub fn is_open(&self) -> bool {
        self.actual_birth_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReproduction {
    pub mother_id: String,
    pub father_id: String,
    pub service_method: ServiceMethod,
    pub service_date: NaiveDate,
    pub expected_birth_date: NaiveDate,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{GESTATION_DAYS, expected_birth_date};

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn gestation_is_278_days() {
        assert_eq!(
            date(2024, 1, 1).map(expected_birth_date),
            date(2024, 10, 5)
        );
        // Crosses a leap day.
        assert_eq!(
            date(2023, 12, 1).map(expected_birth_date),
            date(2024, 9, 4)
        );
    }

    #[test]
    fn offset_matches_constant_for_any_start() {
        let mut day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
        for _ in 0..800 {
            let due = expected_birth_date(day);
            assert_eq!((due - day).num_days(), i64::try_from(GESTATION_DAYS).unwrap_or(0));
            day = day.succ_opt().unwrap_or(day);
        }
    }
}
