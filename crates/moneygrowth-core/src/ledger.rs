//! Quick transaction entry from config-declared snippets
//!
//! A push reads the running balance from the most recent row, then appends
//! a new row carrying the snippet defaults and the updated balances.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use moneygrowth_config::{Config, SnippetConfig};
use moneygrowth_utils::normalize_modify;

use crate::error::{CoreError, CoreResult};
use crate::manager::TableManager;
use crate::position::InsertIndex;
use crate::row::{parse_scalar, RowInput};
use crate::Row;

pub const BALANCE_BEFORE: &str = "balance_before";
pub const BALANCE_AFTER: &str = "balance_after";
pub const AMOUNT: &str = "amount";
pub const DESCRIPTION: &str = "description";

/// Find a snippet by name
pub fn find_snippet<'a>(config: &'a Config, name: &str) -> CoreResult<&'a SnippetConfig> {
    config.snippet(name).ok_or_else(|| CoreError::UnknownSnippet {
        name: name.to_string(),
    })
}

/// Build the row for a push without touching the store.
///
/// Later sources win: snippet defaults, then description/amount/balances,
/// then `modify` overrides (`"k=v;k2=v2"`).
pub fn build_push_row(
    snippet: &SnippetConfig,
    balance: Decimal,
    amount: Decimal,
    description: &str,
    modify: &str,
) -> CoreResult<Row> {
    let mut row = snippet.defaults.clone();
    row.insert(DESCRIPTION.to_string(), Value::String(description.to_string()));
    row.insert(AMOUNT.to_string(), decimal_value(amount)?);
    row.insert(BALANCE_BEFORE.to_string(), decimal_value(balance)?);
    row.insert(BALANCE_AFTER.to_string(), decimal_value(balance - amount)?);

    for (key, value) in normalize_modify(modify) {
        row.insert(key, parse_scalar(&value));
    }
    Ok(row)
}

/// Append a snippet transaction, deducting `amount` from the latest balance
pub async fn push_snippet(
    manager: &TableManager,
    snippet: &SnippetConfig,
    amount: Decimal,
    description: &str,
    modify: &str,
) -> CoreResult<Row> {
    let order_column = manager.spec().id_field.clone();
    let balance = match manager.latest_value(BALANCE_AFTER, &order_column).await? {
        Some(value) => decimal_from_value(&value)?,
        None => {
            log::warn!(target: "moneygrowth::ledger", "no previous balance found, starting from 0");
            Decimal::ZERO
        }
    };

    let row = build_push_row(snippet, balance, amount, description, modify)?;
    log::debug!(target: "moneygrowth::ledger", "pushing {} row: {:?}", snippet.name, row);
    manager
        .add_row(RowInput::FieldMap(row), None, ";", InsertIndex::Append)
        .await
}

/// Read a money cell stored as a JSON number or numeric string
pub fn decimal_from_value(value: &Value) -> CoreResult<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Null => return Ok(Decimal::ZERO),
        other => other.to_string(),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| CoreError::InvalidFormat {
            message: format!("'{}' is not a money amount", text),
        })
}

fn decimal_value(amount: Decimal) -> CoreResult<Value> {
    let text = amount.normalize().to_string();
    serde_json::from_str::<Value>(&text)
        .ok()
        .filter(Value::is_number)
        .ok_or_else(|| CoreError::InvalidFormat {
            message: format!("'{}' cannot be stored as a number", text),
        })
}
