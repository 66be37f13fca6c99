//! Remote table store interface
//!
//! The table manager and viewer never talk to a concrete client. They take a
//! [`StoreRef`] and issue select/insert/update/delete requests through the
//! [`TableStore`] trait.
//!
//! - [`PostgrestStore`]: hosted PostgREST endpoint (Supabase style)
//! - [`MemoryStore`]: in-process table evaluating the same query model

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod postgrest;
pub mod query;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use query::{Filter, Order, Query, StoreResponse};

/// A single row: column name to scalar value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Store reference type
pub type StoreRef = Arc<dyn TableStore>;

/// Capability interface over a remote relational table
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read rows matching the query
    async fn select(&self, table: &str, query: &Query) -> StoreResult<StoreResponse>;

    /// Insert one row and return the stored representation
    async fn insert(&self, table: &str, row: &Row) -> StoreResult<StoreResponse>;

    /// Set the given columns on every row matching all filters
    async fn update(&self, table: &str, patch: &Row, filters: &[Filter]) -> StoreResult<StoreResponse>;

    /// Delete every row matching all filters
    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<StoreResponse>;
}
