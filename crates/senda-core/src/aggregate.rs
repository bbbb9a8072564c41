// ── Domain aggregation ──
//
// Pure functions from record lists to dashboard figures. Every function
// takes "today" explicitly so results are reproducible.

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use crate::display::{Labelled, NEUTRAL_COLOR};
use crate::model::{
    Animal, Event, EventKind, Gender, HealthStatus, Reproduction, Vaccine, expected_birth_date,
};

/// Mean tropical year, used for fractional ages.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Default look-ahead for vaccination events.
pub const DEFAULT_HORIZON_DAYS: u64 = 30;

/// How many animals get a placeholder checkup event.
pub const CHECKUP_PLACEHOLDERS: usize = 5;

/// Spacing between placeholder checkups.
pub const CHECKUP_SPACING_DAYS: u64 = 4;

/// Colours cycled over ownership buckets.
pub const OWNER_PALETTE: [&str; 6] = [
    "#3b82f6", "#8b5cf6", "#10b981", "#f59e0b", "#ef4444", NEUTRAL_COLOR,
];

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

// ── Age ──────────────────────────────────────────────────────────────

/// Unrounded age in years. Bucketing and averages work on this.
#[allow(clippy::cast_precision_loss)]
pub fn fractional_age(birth_date: NaiveDate, today: NaiveDate) -> f64 {
    (today - birth_date).num_days() as f64 / DAYS_PER_YEAR
}

/// Fractional age in years, rounded to one decimal for display.
pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> f64 {
    round1(fractional_age(birth_date, today))
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum AgeBucket {
    #[serde(rename = "0-1")]
    #[strum(serialize = "0-1")]
    UnderOne,
    #[serde(rename = "1-3")]
    #[strum(serialize = "1-3")]
    OneToThree,
    #[serde(rename = "3+")]
    #[strum(serialize = "3+")]
    ThreePlus,
}

pub fn age_category(age_years: f64) -> AgeBucket {
    if age_years < 1.0 {
        AgeBucket::UnderOne
    } else if age_years < 3.0 {
        AgeBucket::OneToThree
    } else {
        AgeBucket::ThreePlus
    }
}

/// Mean age of the herd in years, one decimal. Zero for an empty herd.
#[allow(clippy::cast_precision_loss)]
pub fn average_age(animals: &[Animal], today: NaiveDate) -> f64 {
    if animals.is_empty() {
        return 0.0;
    }
    let sum: f64 = animals
        .iter()
        .map(|a| fractional_age(a.birth_date, today))
        .sum();
    round1(sum / animals.len() as f64)
}

/// Mean of the weights that parse, one decimal. Zero when none do.
#[allow(clippy::cast_precision_loss)]
pub fn average_weight(animals: &[Animal]) -> f64 {
    let weights: Vec<f64> = animals.iter().filter_map(Animal::weight_kg).collect();
    if weights.is_empty() {
        return 0.0;
    }
    round1(weights.iter().sum::<f64>() / weights.len() as f64)
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: HealthStatus,
    pub count: usize,
    /// 0–100, unrounded.
    pub percentage: f64,
    pub color: &'static str,
}

/// Count and share per status.
///
/// The three known statuses always appear first, even at zero. Any other
/// stored value follows in first-seen order.
pub fn status_breakdown(animals: &[Animal]) -> Vec<StatusShare> {
    let mut counts: IndexMap<HealthStatus, usize> = HealthStatus::known()
        .into_iter()
        .map(|s| (s, 0))
        .collect();
    for animal in animals {
        *counts.entry(animal.status.clone()).or_default() += 1;
    }

    let total = animals.len();
    counts
        .into_iter()
        .map(|(status, count)| StatusShare {
            color: status.attrs().color,
            percentage: ratio(count, total),
            status,
            count,
        })
        .collect()
}

fn count_status(animals: &[Animal], status: &HealthStatus) -> usize {
    animals.iter().filter(|a| &a.status == status).count()
}

// ── Ownership ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerShare {
    /// `None` for the synthetic "no data" bucket.
    pub owner: Option<String>,
    pub count: usize,
    pub percentage: f64,
    pub color: &'static str,
}

/// Count and share per distinct owner, in first-seen order.
///
/// Animals without an owner still count toward the total. When no owner
/// bucket results, a single "no data" bucket at 100% is returned.
pub fn ownership_breakdown(animals: &[Animal]) -> Vec<OwnerShare> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for owner in animals.iter().filter_map(|a| a.owner.as_deref()) {
        *counts.entry(owner).or_default() += 1;
    }

    if counts.is_empty() {
        return vec![OwnerShare {
            owner: None,
            count: 0,
            percentage: 100.0,
            color: NEUTRAL_COLOR,
        }];
    }

    let total = animals.len();
    counts
        .into_iter()
        .zip(OWNER_PALETTE.iter().copied().cycle())
        .map(|((owner, count), color)| OwnerShare {
            owner: Some(owner.to_owned()),
            count,
            percentage: ratio(count, total),
            color,
        })
        .collect()
}

// ── Vaccination ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VaccinationStatus {
    pub up_to_date: usize,
    pub pending: usize,
}

/// Up to date iff the next dose is after `today`; pending otherwise.
/// Records without a next dose are not counted.
pub fn vaccination_status(vaccines: &[Vaccine], today: NaiveDate) -> VaccinationStatus {
    vaccines
        .iter()
        .filter_map(|v| v.next_date)
        .fold(VaccinationStatus::default(), |mut acc, next| {
            if next > today {
                acc.up_to_date += 1;
            } else {
                acc.pending += 1;
            }
            acc
        })
}

// ── Gender ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderDistribution {
    pub male: usize,
    pub female: usize,
}

pub fn gender_distribution(animals: &[Animal]) -> GenderDistribution {
    animals
        .iter()
        .fold(GenderDistribution::default(), |mut acc, a| {
            match a.gender {
                Gender::Male => acc.male += 1,
                Gender::Female => acc.female += 1,
            }
            acc
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PregnancySplit {
    pub pregnant: usize,
    pub not_pregnant: usize,
}

/// Pregnant vs. other females.
pub fn pregnancy_split(animals: &[Animal]) -> PregnancySplit {
    let females: Vec<&Animal> = animals.iter().filter(|a| a.is_female()).collect();
    let pregnant = females
        .iter()
        .filter(|a| a.status == HealthStatus::Pregnant)
        .count();
    PregnancySplit {
        pregnant,
        not_pregnant: females.len().saturating_sub(pregnant),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenderAgeRow {
    pub bucket: AgeBucket,
    pub male: usize,
    pub female: usize,
}

/// One row per age bucket, youngest first.
pub fn gender_age_matrix(animals: &[Animal], today: NaiveDate) -> Vec<GenderAgeRow> {
    AgeBucket::iter()
        .map(|bucket| {
            let in_bucket = animals
                .iter()
                .filter(|a| age_category(fractional_age(a.birth_date, today)) == bucket);
            let (male, female) = in_bucket.fold((0, 0), |(m, f), a| match a.gender {
                Gender::Male => (m + 1, f),
                Gender::Female => (m, f + 1),
            });
            GenderAgeRow {
                bucket,
                male,
                female,
            }
        })
        .collect()
}

// ── Events ───────────────────────────────────────────────────────────

/// Upcoming herd events, soonest first.
///
/// - vaccinations whose next dose falls before `today + horizon_days`
///   (overdue doses included)
/// - one expected calving per pregnant animal: the latest open service
///   record's expected date, or else a gestation estimate from the entry
///   date
/// - placeholder checkups for the first few animals
///
/// Ties keep insertion order.
pub fn upcoming_events(
    animals: &[Animal],
    vaccines: &[Vaccine],
    reproductions: &[Reproduction],
    today: NaiveDate,
    horizon_days: u64,
) -> Vec<Event> {
    let horizon = add_days(today, horizon_days);
    let mut events = Vec::new();

    for vaccine in vaccines {
        let Some(next) = vaccine.next_date else {
            continue;
        };
        if next >= horizon {
            continue;
        }
        let animal_name = vaccine
            .animal
            .as_ref()
            .map(|a| a.name.clone())
            .or_else(|| {
                animals
                    .iter()
                    .find(|a| a.id == vaccine.animal_id)
                    .map(|a| a.name.clone())
            })
            .unwrap_or_else(|| "-".into());
        events.push(Event {
            kind: EventKind::Vaccination,
            date: next,
            animal_id: vaccine.animal_id.clone(),
            animal_name,
            detail: Some(vaccine.vaccine_type.clone()),
            estimated: false,
        });
    }

    for animal in animals.iter().filter(|a| a.status == HealthStatus::Pregnant) {
        let service = reproductions
            .iter()
            .filter(|r| r.mother_id == animal.id && r.is_open())
            .max_by_key(|r| r.service_date);
        let (date, estimated) = match service {
            Some(r) => (r.expected_birth_date, false),
            None => {
                let reference = animal
                    .entry_date
                    .unwrap_or_else(|| animal.created_at.date_naive());
                (expected_birth_date(reference), true)
            }
        };
        events.push(Event {
            kind: EventKind::BirthEstimate,
            date,
            animal_id: animal.id.clone(),
            animal_name: animal.name.clone(),
            detail: None,
            estimated,
        });
    }

    for (offset, animal) in (1..).zip(animals.iter().take(CHECKUP_PLACEHOLDERS)) {
        events.push(Event {
            kind: EventKind::Checkup,
            date: add_days(today, CHECKUP_SPACING_DAYS * offset),
            animal_id: animal.id.clone(),
            animal_name: animal.name.clone(),
            detail: None,
            estimated: true,
        });
    }

    events.sort_by_key(|e| e.date);
    events
}

// ── KPI snapshot ─────────────────────────────────────────────────────

/// Everything the general dashboard shows, computed in one pass over the inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub total: usize,
    pub healthy: usize,
    pub sick: usize,
    /// No data source yet; always zero.
    pub critical: usize,
    pub pregnant: usize,
    pub average_age_years: f64,
    pub average_weight_kg: f64,
    pub status: Vec<StatusShare>,
    pub ownership: Vec<OwnerShare>,
    pub vaccination: VaccinationStatus,
    pub genders: GenderDistribution,
    pub pregnancy: PregnancySplit,
    pub gender_age: Vec<GenderAgeRow>,
}

pub fn kpi_snapshot(animals: &[Animal], vaccines: &[Vaccine], today: NaiveDate) -> KpiSnapshot {
    KpiSnapshot {
        total: animals.len(),
        healthy: count_status(animals, &HealthStatus::Healthy),
        sick: count_status(animals, &HealthStatus::Sick),
        critical: 0,
        pregnant: count_status(animals, &HealthStatus::Pregnant),
        average_age_years: average_age(animals, today),
        average_weight_kg: average_weight(animals),
        status: status_breakdown(animals),
        ownership: ownership_breakdown(animals),
        vaccination: vaccination_status(vaccines, today),
        genders: gender_distribution(animals),
        pregnancy: pregnancy_split(animals),
        gender_age: gender_age_matrix(animals, today),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{AnimalSummary, ServiceMethod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn animal(id: &str, gender: Gender, birth: NaiveDate, status: HealthStatus) -> Animal {
        Animal {
            id: id.into(),
            tag: format!("SND-{id}"),
            name: format!("Animal {id}"),
            gender,
            birth_date: birth,
            entry_date: Some(date(2024, 1, 1)),
            breed: "Brahman".into(),
            status,
            ear_tag: None,
            owner: None,
            farm: None,
            paddock: None,
            purpose: None,
            weight: None,
            category: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            user_id: "u1".into(),
        }
    }

    fn vaccine(id: &str, animal_id: &str, next: Option<NaiveDate>) -> Vaccine {
        Vaccine {
            id: id.into(),
            animal_id: animal_id.into(),
            vaccine_type: "Aftosa".into(),
            date: date(2024, 1, 10),
            next_date: next,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            animal: None,
        }
    }

    // ── age ──

    #[test]
    fn whole_year_anniversaries_are_exact() {
        for years in 0..=25 {
            let birth = date(2024 - years, 6, 15);
            assert_eq!(age_in_years(birth, today()), f64::from(years), "{years} years");
        }
    }

    #[test]
    fn fractional_age_rounds_to_one_decimal() {
        assert_eq!(age_in_years(date(2023, 12, 15), today()), 0.5);
        assert_eq!(age_in_years(date(2022, 6, 15), date(2023, 12, 15)), 1.5);
    }

    #[test]
    fn age_buckets_split_at_one_and_three() {
        assert_eq!(age_category(0.0), AgeBucket::UnderOne);
        assert_eq!(age_category(0.9), AgeBucket::UnderOne);
        assert_eq!(age_category(1.0), AgeBucket::OneToThree);
        assert_eq!(age_category(2.9), AgeBucket::OneToThree);
        assert_eq!(age_category(3.0), AgeBucket::ThreePlus);
        assert_eq!(AgeBucket::ThreePlus.to_string(), "3+");
    }

    #[test]
    fn buckets_use_the_unrounded_age() {
        // 351 days shows as 1.0 years but is still a yearling.
        let yearling = date(2023, 6, 30);
        assert_eq!(age_in_years(yearling, today()), 1.0);
        assert!(fractional_age(yearling, today()) < 1.0);

        let herd = [animal("1", Gender::Male, yearling, HealthStatus::Healthy)];
        let matrix = gender_age_matrix(&herd, today());
        assert_eq!(matrix[0].bucket, AgeBucket::UnderOne);
        assert_eq!(matrix[0].male, 1);
        assert_eq!(matrix[1].male, 0);
    }

    #[test]
    fn average_age_rounds_once() {
        // 91, 91 and 127 days: rounded first the mean would be 0.2.
        let herd = [
            animal("1", Gender::Male, date(2024, 3, 16), HealthStatus::Healthy),
            animal("2", Gender::Male, date(2024, 3, 16), HealthStatus::Healthy),
            animal("3", Gender::Female, date(2024, 2, 9), HealthStatus::Healthy),
        ];
        assert_eq!(average_age(&herd, today()), 0.3);
    }

    #[test]
    fn averages_ignore_unparseable_weights() {
        let mut a = animal("1", Gender::Male, date(2022, 6, 15), HealthStatus::Healthy);
        let mut b = animal("2", Gender::Male, date(2020, 6, 15), HealthStatus::Healthy);
        let mut c = animal("3", Gender::Female, date(2020, 6, 15), HealthStatus::Healthy);
        a.weight = Some("400".into());
        b.weight = Some("451".into());
        c.weight = Some("heavy".into());

        let herd = [a, b, c];
        assert_eq!(average_weight(&herd), 425.5);
        assert_eq!(average_age(&herd, today()), 3.3);
        assert_eq!(average_weight(&[]), 0.0);
        assert_eq!(average_age(&[], today()), 0.0);
    }

    // ── status ──

    #[test]
    fn empty_status_breakdown_is_all_zero() {
        let shares = status_breakdown(&[]);
        assert_eq!(shares.len(), 3);
        assert!(shares.iter().all(|s| s.count == 0 && s.percentage == 0.0));
    }

    #[test]
    fn status_percentages_sum_to_hundred() {
        let statuses = [
            HealthStatus::Healthy,
            HealthStatus::Healthy,
            HealthStatus::Sick,
            HealthStatus::Pregnant,
            HealthStatus::Other("quarantine".into()),
            HealthStatus::Healthy,
            HealthStatus::Other("sold".into()),
        ];
        for n in 1..=statuses.len() {
            let herd: Vec<Animal> = statuses[..n]
                .iter()
                .enumerate()
                .map(|(i, s)| animal(&i.to_string(), Gender::Female, today(), s.clone()))
                .collect();
            let sum: f64 = status_breakdown(&herd).iter().map(|s| s.percentage).sum();
            assert!((sum - 100.0).abs() < 1e-9, "n={n}: sum={sum}");
        }
    }

    #[test]
    fn unknown_statuses_are_preserved_in_first_seen_order() {
        let herd = [
            animal("1", Gender::Male, today(), HealthStatus::Other("sold".into())),
            animal("2", Gender::Male, today(), HealthStatus::Healthy),
            animal("3", Gender::Male, today(), HealthStatus::Other("quarantine".into())),
            animal("4", Gender::Male, today(), HealthStatus::Other("sold".into())),
        ];
        let shares = status_breakdown(&herd);
        let order: Vec<(&str, usize)> = shares
            .iter()
            .map(|s| (s.status.as_str(), s.count))
            .collect();
        assert_eq!(
            order,
            [
                ("healthy", 1),
                ("sick", 0),
                ("pregnant", 0),
                ("sold", 2),
                ("quarantine", 1)
            ]
        );
        assert_eq!(shares[3].percentage, 50.0);
    }

    // ── ownership ──

    #[test]
    fn empty_ownership_is_single_no_data_bucket() {
        let shares = ownership_breakdown(&[]);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].owner, None);
        assert_eq!(shares[0].percentage, 100.0);
    }

    #[test]
    fn ownership_counts_distinct_owners() {
        let mut herd: Vec<Animal> = (0..4)
            .map(|i| animal(&i.to_string(), Gender::Male, today(), HealthStatus::Healthy))
            .collect();
        herd[0].owner = Some("Finca Norte".into());
        herd[1].owner = Some("Finca Sur".into());
        herd[2].owner = Some("Finca Norte".into());

        let shares = ownership_breakdown(&herd);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].owner.as_deref(), Some("Finca Norte"));
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].percentage, 50.0);
        assert_eq!(shares[1].percentage, 25.0);
        assert_eq!(shares[0].color, OWNER_PALETTE[0]);
        assert_eq!(shares[1].color, OWNER_PALETTE[1]);
    }

    // ── vaccination ──

    #[test]
    fn next_dose_today_is_pending() {
        let status = vaccination_status(&[vaccine("v1", "a1", Some(today()))], today());
        assert_eq!(
            status,
            VaccinationStatus {
                up_to_date: 0,
                pending: 1
            }
        );
    }

    #[test]
    fn future_doses_are_never_pending_for_any_today() {
        let next = date(2024, 6, 20);
        let vaccines = [vaccine("v1", "a1", Some(next)), vaccine("v2", "a1", None)];
        let mut day = date(2024, 6, 1);
        while day <= date(2024, 6, 30) {
            let status = vaccination_status(&vaccines, day);
            assert_eq!(status.up_to_date + status.pending, 1);
            assert_eq!(status.up_to_date == 1, next > day, "today={day}");
            day = day.succ_opt().unwrap();
        }
    }

    // ── gender ──

    #[test]
    fn gender_and_pregnancy_counts() {
        let herd = [
            animal("1", Gender::Female, date(2023, 12, 15), HealthStatus::Pregnant),
            animal("2", Gender::Female, date(2022, 6, 15), HealthStatus::Healthy),
            animal("3", Gender::Male, date(2019, 6, 15), HealthStatus::Sick),
        ];
        assert_eq!(
            gender_distribution(&herd),
            GenderDistribution { male: 1, female: 2 }
        );
        assert_eq!(
            pregnancy_split(&herd),
            PregnancySplit {
                pregnant: 1,
                not_pregnant: 1
            }
        );

        let matrix = gender_age_matrix(&herd, today());
        let flat: Vec<(AgeBucket, usize, usize)> =
            matrix.iter().map(|r| (r.bucket, r.male, r.female)).collect();
        assert_eq!(
            flat,
            [
                (AgeBucket::UnderOne, 0, 1),
                (AgeBucket::OneToThree, 0, 1),
                (AgeBucket::ThreePlus, 1, 0)
            ]
        );
    }

    // ── events ──

    #[test]
    fn events_are_sorted_and_filtered_by_horizon() {
        let herd = [animal("a1", Gender::Female, date(2020, 1, 1), HealthStatus::Healthy)];
        let mut v_overdue = vaccine("v1", "a1", Some(date(2024, 6, 1)));
        v_overdue.animal = Some(AnimalSummary {
            name: "Luna".into(),
            tag: "SND-a1".into(),
        });
        let vaccines = [
            vaccine("v0", "a1", Some(date(2024, 7, 20))),
            v_overdue,
            vaccine("v2", "a1", Some(date(2024, 7, 14))),
            vaccine("v3", "a1", Some(date(2024, 7, 15))),
            vaccine("v4", "a1", None),
        ];

        let events = upcoming_events(&herd, &vaccines, &[], today(), DEFAULT_HORIZON_DAYS);
        let summary: Vec<(EventKind, NaiveDate)> =
            events.iter().map(|e| (e.kind, e.date)).collect();
        assert_eq!(
            summary,
            [
                (EventKind::Vaccination, date(2024, 6, 1)),
                (EventKind::Checkup, date(2024, 6, 19)),
                (EventKind::Vaccination, date(2024, 7, 14)),
            ]
        );
        assert_eq!(events[0].animal_name, "Luna");
        assert_eq!(events[2].animal_name, "Animal a1");
    }

    #[test]
    fn birth_estimates_use_the_gestation_model() {
        let mut with_service =
            animal("a1", Gender::Female, date(2020, 1, 1), HealthStatus::Pregnant);
        with_service.entry_date = Some(date(2023, 1, 1));
        let without_service =
            animal("a2", Gender::Female, date(2020, 1, 1), HealthStatus::Pregnant);

        let service = |id: &str, served: NaiveDate, actual: Option<NaiveDate>| Reproduction {
            id: id.into(),
            mother_id: "a1".into(),
            father_id: "b1".into(),
            service_method: ServiceMethod::Natural,
            service_date: served,
            expected_birth_date: expected_birth_date(served),
            actual_birth_date: actual,
            status: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let reproductions = [
            service("r-old", date(2023, 1, 1), Some(date(2023, 10, 6))),
            service("r-open", date(2024, 2, 1), None),
        ];

        let events = upcoming_events(
            &[with_service, without_service],
            &[],
            &reproductions,
            today(),
            DEFAULT_HORIZON_DAYS,
        );
        let births: Vec<&Event> = events
            .iter()
            .filter(|e| e.kind == EventKind::BirthEstimate)
            .collect();

        assert_eq!(births.len(), 2);
        let a1 = births.iter().find(|e| e.animal_id == "a1").unwrap();
        assert_eq!(a1.date, date(2024, 11, 5));
        assert!(!a1.estimated);
        let a2 = births.iter().find(|e| e.animal_id == "a2").unwrap();
        assert_eq!(a2.date, expected_birth_date(date(2024, 1, 1)));
        assert!(a2.estimated);
    }

    #[test]
    fn checkups_cover_the_first_five_animals_deterministically() {
        let herd: Vec<Animal> = (0..8)
            .map(|i| animal(&i.to_string(), Gender::Male, today(), HealthStatus::Healthy))
            .collect();
        let first = upcoming_events(&herd, &[], &[], today(), DEFAULT_HORIZON_DAYS);
        let second = upcoming_events(&herd, &[], &[], today(), DEFAULT_HORIZON_DAYS);

        assert_eq!(first, second);
        assert_eq!(first.len(), CHECKUP_PLACEHOLDERS);
        assert_eq!(first[0].date, date(2024, 6, 19));
        assert_eq!(first[4].date, date(2024, 7, 5));
    }

    #[test]
    fn same_day_events_keep_insertion_order() {
        let herd = [animal("a1", Gender::Male, today(), HealthStatus::Healthy)];
        let checkup_day = date(2024, 6, 19);
        let vaccines = [
            vaccine("v1", "a1", Some(checkup_day)),
            vaccine("v2", "a1", Some(checkup_day)),
        ];
        let events = upcoming_events(&herd, &vaccines, &[], today(), DEFAULT_HORIZON_DAYS);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [EventKind::Vaccination, EventKind::Vaccination, EventKind::Checkup]
        );
    }

    #[test]
    fn kpi_snapshot_bundles_counts() {
        let herd = [
            animal("1", Gender::Female, date(2022, 6, 15), HealthStatus::Pregnant),
            animal("2", Gender::Male, date(2020, 6, 15), HealthStatus::Sick),
            animal("3", Gender::Male, date(2023, 6, 15), HealthStatus::Healthy),
        ];
        let snapshot = kpi_snapshot(&herd, &[vaccine("v1", "1", Some(date(2024, 7, 1)))], today());

        assert_eq!(snapshot.total, 3);
        assert_eq!(
            (snapshot.healthy, snapshot.sick, snapshot.pregnant, snapshot.critical),
            (1, 1, 1, 0)
        );
        assert_eq!(snapshot.average_age_years, 2.3);
        assert_eq!(snapshot.vaccination.up_to_date, 1);
        assert_eq!(snapshot.ownership[0].owner, None);
    }
}
