use serde::Serialize;

use crate::access::{AnimalQuery, DataAccess};
use crate::error::CoreError;
use crate::filter::CattleFilter;
use crate::model::Animal;
use crate::session::Session;

/// The herd table: the user's animals narrowed by search and column filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CattleTable {
    pub animals: Vec<Animal>,
    /// Size of the herd before filtering.
    pub total: usize,
}

impl CattleTable {
    pub fn build(animals: Vec<Animal>, filter: &CattleFilter) -> Self {
        let total = animals.len();
        let animals = if filter.is_empty() {
            animals
        } else {
            animals.into_iter().filter(|a| filter.matches(a)).collect()
        };
        Self { animals, total }
    }

    pub async fn load(
        access: &DataAccess,
        session: &Session,
        filter: &CattleFilter,
    ) -> Result<Self, CoreError> {
        let animals = access
            .list_animals(session, &AnimalQuery::default())
            .await?;
        Ok(Self::build(animals, filter))
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}
