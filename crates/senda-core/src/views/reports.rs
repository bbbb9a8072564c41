use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::access::{AnimalQuery, DataAccess};
use crate::error::CoreError;
use crate::model::{Activity, ActivityKind, Animal, Vaccine};
use crate::session::Session;

/// Reporting window, measured back from "now" in UTC.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DateRange {
    /// Since midnight.
    Today,
    /// The last 7 days.
    #[default]
    Week,
    /// The last 30 days.
    Month,
    All,
}

impl DateRange {
    /// Earliest `created_at` included, `None` for [`DateRange::All`].
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            Self::Week => Some(now - TimeDelta::days(7)),
            Self::Month => Some(now - TimeDelta::days(30)),
            Self::All => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActivityFilter {
    #[default]
    All,
    Animal,
    Vaccine,
}

impl ActivityFilter {
    fn wants_animals(self) -> bool {
        matches!(self, Self::All | Self::Animal)
    }

    fn wants_vaccines(self) -> bool {
        matches!(self, Self::All | Self::Vaccine)
    }
}

/// Registrations and vaccinations in a window, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub range: DateRange,
    pub filter: ActivityFilter,
    pub since: Option<DateTime<Utc>>,
    pub activities: Vec<Activity>,
    pub animal_count: usize,
    pub vaccine_count: usize,
}

impl Report {
    pub fn build(
        range: DateRange,
        filter: ActivityFilter,
        now: DateTime<Utc>,
        animals: &[Animal],
        vaccines: Vec<Vaccine>,
    ) -> Self {
        let since = range.start(now);
        let in_range = |at: &DateTime<Utc>| since.is_none_or(|start| *at >= start);

        let mut activities: Vec<Activity> = Vec::new();
        if filter.wants_animals() {
            activities.extend(
            animals
                .iter()
                .filter(|a| in_range(&a.created_at))
                .map(Activity::from),
        );
        }
        if filter.wants_vaccines() {
            activities.extend(
                vaccines
                    .into_iter()
                    .filter(|v| in_range(&v.created_at))
                    .map(Activity::from),
            );
        }
        activities.sort_by(|a, b| b.at.cmp(&a.at));

        let count = |kind| activities.iter().filter(|a| a.kind == kind).count();
        Self {
            animal_count: count(ActivityKind::AnimalRegistered),
            vaccine_count: count(ActivityKind::VaccineApplied),
            range,
            filter,
            since,
            activities,
        }
    }

    /// Fetch only the tables the filter asks for, already narrowed to the window.
    pub async fn load(
        access: &DataAccess,
        session: &Session,
        range: DateRange,
        filter: ActivityFilter,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let since = range.start(now);
        let query = AnimalQuery {
            created_since: since,
            ..AnimalQuery::default()
        };
        let animals = async {
            if filter.wants_animals() {
                access.list_animals(session, &query).await
            } else {
                Ok(Vec::new())
            }
        };
        let vaccines = async {
            if filter.wants_vaccines() {
                access.list_vaccines(session, since).await
            } else {
                Ok(Vec::new())
            }
        };
        let (animals, vaccines) = tokio::try_join!(animals, vaccines)?;
        Ok(Self::build(range, filter, now, &animals, vaccines))
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}
