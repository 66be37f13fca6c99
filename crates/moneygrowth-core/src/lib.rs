//! Core table management and ledger logic
//!
//! [`TableManager`] wraps one remote table and keeps rows in a stable order
//! through a fractional position column. [`ledger`] builds quick-entry
//! transactions on top of it.

pub mod error;
pub mod ledger;
pub mod manager;
pub mod position;
pub mod row;

pub use moneygrowth_store::Row;

pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use ledger::{find_snippet, push_snippet};
pub use manager::{Page, TableManager, TableSpec};
pub use position::InsertIndex;
pub use row::{parse_scalar, RowInput};
