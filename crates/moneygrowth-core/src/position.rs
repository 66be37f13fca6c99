//! Fractional row positions
//!
//! New rows get a position strictly between their neighbours, so inserting
//! at a logical index never renumbers existing rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use std::str::FromStr;

use moneygrowth_store::{Query, TableStore};

use crate::error::{CoreError, CoreResult};

static AFTER_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\+?$").unwrap());

/// Where a new row goes in ascending position order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertIndex {
    /// After the last row
    #[default]
    Append,
    /// Immediately after the row currently at this 0-based index
    After(usize),
}

impl FromStr for InsertIndex {
    type Err = CoreError;

    /// `""` / `"-"` append, `"3+"` or `"3"` insert after index 3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Ok(InsertIndex::Append);
        }
        AFTER_INDEX
            .captures(trimmed)
            .and_then(|c| c[1].parse().ok())
            .map(InsertIndex::After)
            .ok_or_else(|| CoreError::InvalidIndex {
                index: s.to_string(),
            })
    }
}

impl TryFrom<i64> for InsertIndex {
    type Error = CoreError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .map(InsertIndex::After)
            .map_err(|_| CoreError::InvalidIndex {
                index: index.to_string(),
            })
    }
}

impl From<usize> for InsertIndex {
    fn from(index: usize) -> Self {
        InsertIndex::After(index)
    }
}

impl std::fmt::Display for InsertIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertIndex::Append => write!(f, "-"),
            InsertIndex::After(i) => write!(f, "{}+", i),
        }
    }
}

/// Computes positions against one table's position column
pub struct PositionAllocator<'a> {
    store: &'a dyn TableStore,
    table: &'a str,
    field: &'a str,
}

impl<'a> PositionAllocator<'a> {
    pub fn new(store: &'a dyn TableStore, table: &'a str, field: &'a str) -> Self {
        Self { store, table, field }
    }

    /// Position that lands a new row at `index` once sorted ascending
    pub async fn position_for(&self, index: InsertIndex) -> CoreResult<f64> {
        match index {
            InsertIndex::Append => self.append_position().await,
            InsertIndex::After(i) => self.position_after(i).await,
        }
    }

    /// Highest position plus one, or 1 for an empty table
    pub async fn append_position(&self) -> CoreResult<f64> {
        Ok(self.max_position().await?.map_or(1.0, |max| max + 1.0))
    }

    // Rows without a position are ignored.
    async fn max_position(&self) -> CoreResult<Option<f64>> {
        let query = Query::new()
            .columns([self.field])
            .order_nulls_last(self.field, true)
            .limit(1);
        let res = self.store.select(self.table, &query).await?;
        res.data
            .first()
            .and_then(|row| row.get(self.field))
            .filter(|value| !value.is_null())
            .map(|value| position_of(Some(value)))
            .transpose()
    }

    async fn position_after(&self, index: usize) -> CoreResult<f64> {
        let Some(next_index) = index.checked_add(1) else {
            return self.append_position().await;
        };
        let query = Query::new()
            .columns([self.field])
            .order(self.field, false)
            .range(index, next_index);
        let res = self.store.select(self.table, &query).await?;

        let mut rows = res.data.iter();
        let curr = match rows.next() {
            Some(row) => position_of(row.get(self.field))?,
            None => {
                log::debug!(target: "moneygrowth::position", "no row at index {}, appending", index);
                return self.append_position().await;
            }
        };
        match rows.next() {
            Some(row) => midpoint(curr, position_of(row.get(self.field))?),
            None => Ok(curr + 1.0),
        }
    }
}

/// Mean of two neighbouring positions, rejected once it stops separating them
pub fn midpoint(curr: f64, next: f64) -> CoreResult<f64> {
    let mean = curr + (next - curr) / 2.0;
    if curr < mean && mean < next {
        Ok(mean)
    } else {
        Err(CoreError::PositionExhausted {
            after: curr,
            before: next,
        })
    }
}

/// Read a stored position cell
pub fn position_of(value: Option<&Value>) -> CoreResult<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CoreError::InvalidPosition {
        value: value.map_or_else(|| "missing".to_string(), Value::to_string),
    })
}

/// Encode a position, as an integer when it has no fractional part
pub fn position_value(position: f64) -> CoreResult<Value> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if position.fract() == 0.0 && position.abs() < MAX_EXACT {
        return Ok(Value::from(position as i64));
    }
    Number::from_f64(position)
        .map(Value::Number)
        .ok_or_else(|| CoreError::InvalidPosition {
            value: position.to_string(),
        })
}
