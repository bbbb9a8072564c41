use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::access::DataAccess;
use crate::display::{Locale, time_ago};
use crate::error::CoreError;
use crate::model::Activity;
use crate::session::Session;

/// Records fetched per kind.
pub const RECENT_PER_KIND: usize = 3;

/// Entries kept after merging.
pub const ACTIVITY_FEED_LEN: usize = 5;

/// The sidebar's recent-activity list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityFeed {
    pub entries: Vec<Activity>,
}

impl ActivityFeed {
    /// Merge newest first and keep the top entries.
    pub fn build(animals: Vec<Activity>, vaccines: Vec<Activity>) -> Self {
        let mut entries: Vec<Activity> = animals.into_iter().chain(vaccines).collect();
        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries.truncate(ACTIVITY_FEED_LEN);
        Self { entries }
    }

    pub async fn load(access: &DataAccess, session: &Session) -> Result<Self, CoreError> {
        let (animals, vaccines) = tokio::try_join!(
            access.recent_animals(session, RECENT_PER_KIND),
            access.recent_vaccines(session, RECENT_PER_KIND),
        )?;
        Ok(Self::build(animals, vaccines))
    }

    /// `(description, relative time)` pairs for display.
    pub fn lines(&self, now: DateTime<Utc>, locale: Locale) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|a| (a.describe(locale), time_ago(a.at, now, locale)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::ActivityFeed;
    use crate::display::Locale;
    use crate::model::{Activity, ActivityKind};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, kind: ActivityKind, minutes_ago: i64) -> Activity {
        Activity {
            id: id.into(),
            kind,
            at: now() - TimeDelta::minutes(minutes_ago),
            animal_name: "Luna".into(),
            animal_tag: Some("SND-001".into()),
            vaccine_type: Some("Aftosa".into()),
        }
    }

    #[test]
    fn keeps_the_five_newest() {
        let animals = vec![
            entry("animal-1", ActivityKind::AnimalRegistered, 10),
            entry("animal-2", ActivityKind::AnimalRegistered, 50),
            entry("animal-3", ActivityKind::AnimalRegistered, 90),
        ];
        let vaccines = vec![
            entry("vaccine-1", ActivityKind::VaccineApplied, 5),
            entry("vaccine-2", ActivityKind::VaccineApplied, 60),
            entry("vaccine-3", ActivityKind::VaccineApplied, 120),
        ];

        let feed = ActivityFeed::build(animals, vaccines);
        let ids: Vec<&str> = feed.entries.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["vaccine-1", "animal-1", "animal-2", "vaccine-2", "animal-3"]);
    }

    #[test]
    fn lines_carry_relative_times() {
        let feed = ActivityFeed::build(
            vec![entry("animal-1", ActivityKind::AnimalRegistered, 120)],
            vec![],
        );
        assert_eq!(
            feed.lines(now(), Locale::Es),
            [(
                "Nuevo animal registrado: Luna (SND-001)".to_owned(),
                "Hace 2 horas".to_owned()
            )]
        );
    }
}
