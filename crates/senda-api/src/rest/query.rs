// PostgREST query builder.
//
// Encodes horizontal filtering (`col=op.value`), vertical filtering and
// resource embedding (`select=*,animals(name,tag)`), ordering and limits
// into query-string pairs.

use std::fmt;

/// Sort direction for an `order` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn suffix(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A query against a single table.
///
/// ```
/// use senda_api::{Order, Query};
///
/// let q = Query::table("vaccines")
///     .select("*,animals(name,tag)")
///     .eq("user_id", "u-1")
///     .gte("next_date", "2024-06-01")
///     .order("created_at", Order::Descending)
///     .limit(3);
/// assert_eq!(q.table_name(), "vaccines");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Columns and embedded relations to return. Defaults to `*`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lte(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "lte", value)
    }

    /// Apply a filter only when `value` is present.
    pub fn eq_opt(self, column: &str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn gte_opt(self, column: &str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.gte(column, v),
            None => self,
        }
    }

    pub fn order(mut self, column: impl Into<String>, direction: Order) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Whether any row filter is present. Writes without one are refused.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    fn filter(mut self, column: &str, op: &str, value: impl fmt::Display) -> Self {
        self.filters.push((column.to_owned(), format!("{op}.{value}")));
        self
    }

    /// Query-string pairs for reads.
    pub(crate) fn read_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        params.push((
            "select".to_owned(),
            self.select.clone().unwrap_or_else(|| "*".into()),
        ));
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            let clause = self
                .order
                .iter()
                .map(|(col, dir)| format!("{col}.{}", dir.suffix()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_owned(), clause));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_owned(), n.to_string()));
        }
        params
    }

    /// Query-string pairs for writes: filters only, plus `select` when set.
    pub(crate) fn write_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self.filters.clone();
        if let Some(ref select) = self.select {
            params.push(("select".to_owned(), select.clone()));
        }
        params
    }
}
