//! Query model shared by every store implementation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Row;

/// Row predicate evaluated by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Column equals value
    Eq(String, Value),
    /// Column is one of the values
    In(String, Vec<Value>),
    /// Column text matches a regular expression (evaluated store-side)
    Regex(String, String),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn in_set(column: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In(column.into(), values)
    }

    pub fn regex(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Regex(column.into(), pattern.into())
    }

    /// Column the filter applies to
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::In(c, _) | Filter::Regex(c, _) => c,
        }
    }
}

/// Sort order on a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub descending: bool,
    /// Place nulls after every value regardless of direction
    #[serde(default)]
    pub nulls_last: bool,
}

/// A select request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Projected columns; `None` selects everything
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    /// Inclusive 0-based `(from, to)` row range applied after ordering
    pub range: Option<(usize, usize)>,
    pub limit: Option<usize>,
    /// Ask the store for the exact number of matching rows
    pub count: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
            nulls_last: false,
        });
        self
    }

    /// Like [`Query::order`], but nulls sort after every value
    pub fn order_nulls_last(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
            nulls_last: true,
        });
        self
    }

    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.range = Some((from, to));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Offset and row budget implied by `range` and `limit`.
    ///
    /// A range ending at `usize::MAX` has no row budget of its own.
    pub fn window(&self) -> (usize, Option<usize>) {
        let (offset, mut len) = match self.range {
            Some((from, to)) => (from, to.checked_add(1).map(|end| end.saturating_sub(from))),
            None => (0, None),
        };
        if let Some(limit) = self.limit {
            len = Some(len.map_or(limit, |l| l.min(limit)));
        }
        (offset, len)
    }
}

/// Result of any store call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreResponse {
    /// Returned rows
    pub data: Vec<Row>,
    /// Matching or affected row count, when the store reported one
    pub count: Option<u64>,
}

impl StoreResponse {
    /// Count reported by the store, or zero
    pub fn affected(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let query = Query::new()
            .columns(["id"])
            .filter(Filter::eq("type", "buy"))
            .order("id", true)
            .range(2, 4)
            .with_count();

        assert_eq!(query.columns, Some(vec!["id".to_string()]));
        assert_eq!(query.filters, vec![Filter::Eq("type".to_string(), json!("buy"))]);
        assert!(query.order.as_ref().unwrap().descending);
        assert!(query.count);
    }

    #[test]
    fn test_window() {
        assert_eq!(Query::new().window(), (0, None));
        assert_eq!(Query::new().range(2, 4).window(), (2, Some(3)));
        assert_eq!(Query::new().range(5, 5).window(), (5, Some(1)));
        assert_eq!(Query::new().limit(1).window(), (0, Some(1)));
        assert_eq!(Query::new().range(0, 9).limit(4).window(), (0, Some(4)));
    }

    #[test]
    fn test_window_open_ended_range() {
        assert_eq!(Query::new().range(2, usize::MAX).window(), (2, None));
        assert_eq!(Query::new().range(2, usize::MAX - 1).window(), (2, Some(usize::MAX - 2)));
        assert_eq!(Query::new().range(0, usize::MAX).limit(5).window(), (0, Some(5)));
        assert_eq!(Query::new().range(4, 2).window(), (4, Some(0)));
    }

    #[test]
    fn test_order_nulls_last() {
        let query = Query::new().order_nulls_last("position", true);
        let order = query.order.unwrap();
        assert!(order.descending && order.nulls_last);
        assert!(!Query::new().order("id", false).order.unwrap().nulls_last);
    }

    #[test]
    fn test_filter_column() {
        assert_eq!(Filter::regex("note", "^a").column(), "note");
        assert_eq!(Filter::in_set("id", vec![json!(1)]).column(), "id");
    }
}
