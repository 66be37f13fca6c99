//! In-memory table store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query, StoreResponse};
use crate::{Row, TableStore};

/// An in-memory table store.
///
/// Evaluates the same [`Query`] model as the remote store: equality and
/// set filters compare values by their text form when the JSON types
/// differ, regex filters match against the cell text, and ordering puts
/// nulls last when ascending (first when descending). Rows live only as
/// long as the store.
///
/// # Example
///
/// ```
/// use moneygrowth_store::MemoryStore;
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.seed("transactions", vec![json!({"id": 1, "amount": 5})]);
/// assert_eq!(store.rows("transactions").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    /// Column filled with `max + 1` when an inserted row omits it
    identity: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that assigns `column` like a serial primary key.
    pub fn with_identity(column: impl Into<String>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            identity: Some(column.into()),
        }
    }

    /// Appends rows to a table. Non-object values are skipped.
    ///
    /// Fixture helper: unlike the [`TableStore`] methods it reads through a
    /// poisoned lock instead of failing.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let entry = tables.entry(table.to_string()).or_default();
        entry.extend(rows.into_iter().filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        }));
    }

    /// Snapshot of a table in storage order. Reads through a poisoned lock
    /// like [`MemoryStore::seed`].
    pub fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(table).cloned().unwrap_or_default()
    }

    fn next_identity(rows: &[Row], column: &str) -> Value {
        let max = rows
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        Value::from(max + 1)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<StoreResponse> {
        let matchers = compile(&query.filters)?;
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;

        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, &matchers)).cloned().collect())
            .unwrap_or_default();

        let total = rows.len() as u64;

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                compare_values(a.get(&order.column), b.get(&order.column), order.descending, order.nulls_last)
            });
        }

        let (offset, len) = query.window();
        let rows = rows.into_iter().skip(offset);
        let mut data: Vec<Row> = match len {
            Some(len) => rows.take(len).collect(),
            None => rows.collect(),
        };

        if let Some(columns) = &query.columns {
            if !columns.iter().any(|c| c == "*") {
                for row in &mut data {
                    row.retain(|k, _| columns.contains(k));
                }
            }
        }

        Ok(StoreResponse {
            data,
            count: query.count.then_some(total),
        })
    }

    async fn insert(&self, table: &str, row: &Row) -> StoreResult<StoreResponse> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.entry(table.to_string()).or_default();

        let mut row = row.clone();
        if let Some(identity) = &self.identity {
            if row.get(identity).map_or(true, Value::is_null) {
                row.insert(identity.clone(), Self::next_identity(rows, identity));
            }
        }
        rows.push(row.clone());

        Ok(StoreResponse {
            data: vec![row],
            count: Some(1),
        })
    }

    async fn update(&self, table: &str, patch: &Row, filters: &[Filter]) -> StoreResult<StoreResponse> {
        let matchers = compile(filters)?;
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut data = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches_all(r, &matchers)) {
                for (k, v) in patch {
                    row.insert(k.clone(), v.clone());
                }
                data.push(row.clone());
            }
        }

        let count = data.len() as u64;
        Ok(StoreResponse {
            data,
            count: Some(count),
        })
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<StoreResponse> {
        let matchers = compile(filters)?;
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut data = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            let (removed, kept): (Vec<Row>, Vec<Row>) =
                rows.drain(..).partition(|r| matches_all(r, &matchers));
            *rows = kept;
            data = removed;
        }

        let count = data.len() as u64;
        Ok(StoreResponse {
            data,
            count: Some(count),
        })
    }
}

// ==================== Filter evaluation ====================

enum Matcher<'a> {
    Eq(&'a str, &'a Value),
    In(&'a str, &'a [Value]),
    Regex(&'a str, Regex),
}

fn compile(filters: &[Filter]) -> StoreResult<Vec<Matcher<'_>>> {
    filters
        .iter()
        .map(|f| match f {
            Filter::Eq(c, v) => Ok(Matcher::Eq(c.as_str(), v)),
            Filter::In(c, vs) => Ok(Matcher::In(c.as_str(), vs.as_slice())),
            Filter::Regex(c, p) => Regex::new(p)
                .map(|re| Matcher::Regex(c.as_str(), re))
                .map_err(|e| StoreError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                }),
        })
        .collect()
}

fn matches_all(row: &Row, matchers: &[Matcher<'_>]) -> bool {
    matchers.iter().all(|m| match m {
        Matcher::Eq(c, v) => row.get(*c).map_or(false, |cell| values_equal(cell, v)),
        Matcher::In(c, vs) => row
            .get(*c)
            .map_or(false, |cell| vs.iter().any(|v| values_equal(cell, v))),
        Matcher::Regex(c, re) => row
            .get(*c)
            .and_then(cell_text)
            .map_or(false, |text| re.is_match(&text)),
    })
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
        _ => cell_text(a) == cell_text(b),
    }
}

// Nulls count as greater than any value unless `nulls_last` pins them to the end.
fn compare_values(a: Option<&Value>, b: Option<&Value>, descending: bool, nulls_last: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ord = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) if nulls_last => return Ordering::Greater,
        (Some(_), None) if nulls_last => return Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare_present(x, y),
    };
    if descending {
        ord.reverse()
    } else {
        ord
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}
