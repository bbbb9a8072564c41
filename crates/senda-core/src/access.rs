// ── Data access facade ──
//
// Domain-typed reads and writes over the three herd tables. Every query is
// scoped to the session's user and every insert stamps it. Failures are
// surfaced once, unretried.

use chrono::{DateTime, NaiveDate, Utc};
use senda_api::{
    AnimalRow, AnimalUpdateRow, Order, Query, RecentAnimalRow, ReproductionRow, RestClient,
    StatusUpdateRow, VaccineRow,
};
use tracing::debug;

use crate::convert::{
    ConversionError, convert_rows, format_date, new_animal_row, new_reproduction_row,
    new_vaccine_row,
};
use crate::error::CoreError;
use crate::model::{
    Activity, Animal, AnimalUpdate, Gender, HealthStatus, NewAnimal, NewReproduction, NewVaccine,
    Reproduction, Vaccine,
};
use crate::session::Session;

pub const ANIMALS: &str = "animals";
pub const VACCINES: &str = "vaccines";
pub const REPRODUCTIONS: &str = "reproductions";

/// Vaccine columns plus the referenced animal's name and tag.
const VACCINE_WITH_ANIMAL: &str = "*,animals(name,tag)";
const RECENT_ANIMAL_COLUMNS: &str = "id,name,tag,created_at";

/// Server-side filters for [`DataAccess::list_animals`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalQuery {
    pub owner: Option<String>,
    pub gender: Option<Gender>,
    pub created_since: Option<DateTime<Utc>>,
}

impl AnimalQuery {
    pub fn owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn gender(gender: Gender) -> Self {
        Self {
            gender: Some(gender),
            ..Self::default()
        }
    }
}

/// Cheap to clone; wraps a reference-counted HTTP client.
#[derive(Clone)]
pub struct DataAccess {
    rest: RestClient,
}

impl DataAccess {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    fn scoped(table: &str, session: &Session) -> Query {
        Query::table(table).eq("user_id", session.user_id())
    }

    // ── animals ──────────────────────────────────────────────────────

    /// The user's animals, newest first.
    pub async fn list_animals(
        &self,
        session: &Session,
        filter: &AnimalQuery,
    ) -> Result<Vec<Animal>, CoreError> {
        let query = Self::scoped(ANIMALS, session)
            .eq_opt("owner", filter.owner.as_deref())
            .eq_opt("gender", filter.gender)
            .gte_opt("created_at", filter.created_since.map(|t| t.to_rfc3339()))
            .order("created_at", Order::Descending);
        let rows: Vec<AnimalRow> = self.rest.select(session.access_token(), &query).await?;
        debug!(count = rows.len(), "fetched animals");
        Ok(convert_rows(rows))
    }

    /// One animal by id, `None` if it does not exist (or is not the user's).
    pub async fn get_animal(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<Option<Animal>, CoreError> {
        if uuid::Uuid::parse_str(id).is_err() {
            return Ok(None);
        }
        let query = Self::scoped(ANIMALS, session).eq("id", id);
        let row: Option<AnimalRow> = self
            .rest
            .select_single(session.access_token(), &query)
            .await?;
        row.map(Animal::try_from).transpose().map_err(into_core)
    }

    pub async fn find_animal_by_tag(
        &self,
        session: &Session,
        tag: &str,
    ) -> Result<Option<Animal>, CoreError> {
        let query = Self::scoped(ANIMALS, session).eq("tag", tag);
        let row: Option<AnimalRow> = self
            .rest
            .select_single(session.access_token(), &query)
            .await?;
        row.map(Animal::try_from).transpose().map_err(into_core)
    }

    /// Look an animal up by id, falling back to its tag.
    pub async fn resolve_animal(
        &self,
        session: &Session,
        id_or_tag: &str,
    ) -> Result<Option<Animal>, CoreError> {
        if let Some(animal) = self.get_animal(session, id_or_tag).await? {
            return Ok(Some(animal));
        }
        self.find_animal_by_tag(session, id_or_tag).await
    }

    pub async fn create_animal(
        &self,
        session: &Session,
        animal: &NewAnimal,
    ) -> Result<Animal, CoreError> {
        let row = new_animal_row(animal, session.user_id());
        let stored: AnimalRow = self
            .rest
            .insert(session.access_token(), ANIMALS, &row)
            .await?;
        Animal::try_from(stored).map_err(into_core)
    }

    pub async fn update_animal(
        &self,
        session: &Session,
        id: &str,
        update: &AnimalUpdate,
    ) -> Result<Animal, CoreError> {
        let patch = AnimalUpdateRow::from(update);
        self.patch_animal(session, id, &patch).await
    }

    /// Change only the health status.
    pub async fn set_animal_status(
        &self,
        session: &Session,
        id: &str,
        status: &HealthStatus,
    ) -> Result<Animal, CoreError> {
        let patch = StatusUpdateRow::from(status);
        self.patch_animal(session, id, &patch).await
    }

    async fn patch_animal<B>(
        &self,
        session: &Session,
        id: &str,
        patch: &B,
    ) -> Result<Animal, CoreError>
    where
        B: serde::Serialize + Sync,
    {
        let query = Self::scoped(ANIMALS, session).eq("id", id);
        let rows: Vec<AnimalRow> = self
            .rest
            .update(session.access_token(), &query, patch)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("Animal", id))?;
        Animal::try_from(row).map_err(into_core)
    }

    pub async fn delete_animal(&self, session: &Session, id: &str) -> Result<(), CoreError> {
        let query = Self::scoped(ANIMALS, session).eq("id", id);
        let rows: Vec<serde_json::Value> = self.rest.delete(session.access_token(), &query).await?;
        if rows.is_empty() {
            return Err(CoreError::not_found("Animal", id));
        }
        Ok(())
    }

    // ── vaccines ─────────────────────────────────────────────────────

    /// The user's vaccinations, newest first, each with its animal embedded.
    pub async fn list_vaccines(
        &self,
        session: &Session,
        created_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Vaccine>, CoreError> {
        let query = Self::scoped(VACCINES, session)
            .select(VACCINE_WITH_ANIMAL)
            .gte_opt("created_at", created_since.map(|t| t.to_rfc3339()))
            .order("created_at", Order::Descending);
        self.select_vaccines(session, &query).await
    }

    /// An animal's history, latest application first.
    pub async fn list_vaccines_for_animal(
        &self,
        session: &Session,
        animal_id: &str,
    ) -> Result<Vec<Vaccine>, CoreError> {
        let query = Self::scoped(VACCINES, session)
            .eq("animal_id", animal_id)
            .order("date", Order::Descending);
        self.select_vaccines(session, &query).await
    }

    /// Vaccinations whose next dose falls in `[from, to]`.
    pub async fn list_vaccines_due(
        &self,
        session: &Session,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Vaccine>, CoreError> {
        let query = Self::scoped(VACCINES, session)
            .select(VACCINE_WITH_ANIMAL)
            .gte("next_date", format_date(from))
            .lte("next_date", format_date(to))
            .order("next_date", Order::Ascending);
        self.select_vaccines(session, &query).await
    }

    async fn select_vaccines(
        &self,
        session: &Session,
        query: &Query,
    ) -> Result<Vec<Vaccine>, CoreError> {
        let rows: Vec<VaccineRow> = self.rest.select(session.access_token(), query).await?;
        debug!(count = rows.len(), "fetched vaccines");
        Ok(convert_rows(rows))
    }

    pub async fn create_vaccine(
        &self,
        session: &Session,
        vaccine: &NewVaccine,
    ) -> Result<Vaccine, CoreError> {
        let row = new_vaccine_row(vaccine, session.user_id());
        let stored: VaccineRow = self
            .rest
            .insert(session.access_token(), VACCINES, &row)
            .await?;
        Vaccine::try_from(stored).map_err(into_core)
    }

    // ── reproductions ────────────────────────────────────────────────

    pub async fn list_reproductions(
        &self,
        session: &Session,
    ) -> Result<Vec<Reproduction>, CoreError> {
        let query = Self::scoped(REPRODUCTIONS, session).order("service_date", Order::Descending);
        let rows: Vec<ReproductionRow> = self.rest.select(session.access_token(), &query).await?;
        debug!(count = rows.len(), "fetched reproductions");
        Ok(convert_rows(rows))
    }

    pub async fn create_reproduction(
        &self,
        session: &Session,
        reproduction: &NewReproduction,
    ) -> Result<Reproduction, CoreError> {
        let row = new_reproduction_row(reproduction, session.user_id());
        let stored: ReproductionRow = self
            .rest
            .insert(session.access_token(), REPRODUCTIONS, &row)
            .await?;
        Reproduction::try_from(stored).map_err(into_core)
    }

    // ── recent activity ──────────────────────────────────────────────

    /// The `limit` most recently registered animals.
    pub async fn recent_animals(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<Activity>, CoreError> {
        let query = Self::scoped(ANIMALS, session)
            .select(RECENT_ANIMAL_COLUMNS)
            .order("created_at", Order::Descending)
            .limit(limit);
        let rows: Vec<RecentAnimalRow> = self.rest.select(session.access_token(), &query).await?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    /// The `limit` most recently applied vaccines.
    pub async fn recent_vaccines(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<Activity>, CoreError> {
        let query = Self::scoped(VACCINES, session)
            .select(VACCINE_WITH_ANIMAL)
            .order("created_at", Order::Descending)
            .limit(limit);
        let vaccines = self.select_vaccines(session, &query).await?;
        Ok(vaccines.into_iter().map(Activity::from).collect())
    }
}

fn into_core(err: ConversionError) -> CoreError {
    CoreError::Internal(err.to_string())
}
