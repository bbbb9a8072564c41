use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::access::{AnimalQuery, DataAccess};
use crate::aggregate::{DEFAULT_HORIZON_DAYS, KpiSnapshot, kpi_snapshot, upcoming_events};
use crate::chart::{ChartFile, dashboard_charts};
use crate::display::Locale;
use crate::error::CoreError;
use crate::model::{Animal, Event, Reproduction, Vaccine};
use crate::session::Session;

/// General dashboard: KPI cards, distributions and the upcoming events list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Owner the herd was narrowed to, if any.
    pub farm: Option<String>,
    pub today: NaiveDate,
    pub kpis: KpiSnapshot,
    pub events: Vec<Event>,
}

impl DashboardView {
    /// With a farm filter, vaccines and services of animals outside the
    /// filtered herd are ignored.
    pub fn build(
        farm: Option<String>,
        animals: &[Animal],
        vaccines: Vec<Vaccine>,
        reproductions: Vec<Reproduction>,
        today: NaiveDate,
    ) -> Self {
        let (vaccines, reproductions) = if farm.is_some() {
            let ids: HashSet<&str> = animals.iter().map(|a| a.id.as_str()).collect();
            (
                vaccines
                    .into_iter()
                    .filter(|v| ids.contains(v.animal_id.as_str()))
                    .collect(),
                reproductions
                    .into_iter()
                    .filter(|r| ids.contains(r.mother_id.as_str()))
                    .collect(),
            )
        } else {
            (vaccines, reproductions)
        };

        Self {
            kpis: kpi_snapshot(animals, &vaccines, today),
            events: upcoming_events(
                animals,
                &vaccines,
                &reproductions,
                today,
                DEFAULT_HORIZON_DAYS,
            ),
            farm,
            today,
        }
    }

    /// Fetch animals, vaccines and services concurrently.
    pub async fn load(
        access: &DataAccess,
        session: &Session,
        farm: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let query = farm.map(AnimalQuery::owner).unwrap_or_default();
        let (animals, vaccines, reproductions) = tokio::try_join!(
            access.list_animals(session, &query),
            access.list_vaccines(session, None),
            access.list_reproductions(session),
        )?;
        Ok(Self::build(
            farm.map(str::to_owned),
            &animals,
            vaccines,
            reproductions,
            today,
        ))
    }

    pub fn charts(&self, locale: Locale) -> Result<Vec<ChartFile>, CoreError> {
        dashboard_charts(&self.kpis, locale)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::DashboardView;
    use crate::model::{Animal, EventKind, Gender, HealthStatus, Vaccine};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn animal(id: &str, owner: &str, status: HealthStatus) -> Animal {
        Animal {
            id: id.into(),
            tag: format!("SND-{id}"),
            name: format!("Animal {id}"),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            entry_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            breed: "Nelore".into(),
            status,
            ear_tag: None,
            owner: Some(owner.into()),
            farm: None,
            paddock: None,
            purpose: None,
            weight: Some("400".into()),
            category: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            user_id: "u1".into(),
        }
    }

    fn vaccine(id: &str, animal_id: &str, next: NaiveDate) -> Vaccine {
        Vaccine {
            id: id.into(),
            animal_id: animal_id.into(),
            vaccine_type: "Aftosa".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_date: Some(next),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            animal: None,
        }
    }

    #[test]
    fn farm_filter_drops_records_of_other_herds() {
        let herd = [animal("a1", "Ana", HealthStatus::Healthy)];
        let vaccines = vec![
            vaccine("v1", "a1", today()),
            vaccine("v2", "zz", today()),
        ];

        let view = DashboardView::build(Some("Ana".into()), &herd, vaccines, vec![], today());
        assert_eq!(view.kpis.vaccination.pending, 1);
        let vaccinations = view
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Vaccination)
            .count();
        assert_eq!(vaccinations, 1);
    }

    #[test]
    fn unfiltered_dashboard_counts_everything() {
        let herd = [
            animal("a1", "Ana", HealthStatus::Healthy),
            animal("a2", "Luis", HealthStatus::Pregnant),
        ];
        let vaccines = vec![vaccine("v1", "a1", today()), vaccine("v2", "zz", today())];

        let view = DashboardView::build(None, &herd, vaccines, vec![], today());
        assert_eq!(view.kpis.total, 2);
        assert_eq!(view.kpis.pregnant, 1);
        assert_eq!(view.kpis.vaccination.pending, 2);
        assert!(
            view.events
                .iter()
                .any(|e| e.kind == EventKind::BirthEstimate && e.estimated)
        );
    }
}
