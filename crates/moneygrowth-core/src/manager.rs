//! Table manager: the single point of access to one remote table

use serde::Serialize;
use serde_json::Value;

use moneygrowth_config::StoreConfig;
use moneygrowth_store::{Filter, Query, StoreRef};

use crate::error::{CoreError, CoreResult};
use crate::position::{position_value, InsertIndex, PositionAllocator};
use crate::row::RowInput;
use crate::Row;

/// Which table to manage and which of its columns are reserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table: String,
    /// Unique identifier column
    pub id_field: String,
    /// Numeric ordering column, if the table has one
    pub position_field: Option<String>,
}

impl TableSpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_field: "id".to_string(),
            position_field: Some("position".to_string()),
        }
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_position_field(mut self, field: Option<impl Into<String>>) -> Self {
        self.position_field = field.map(Into::into);
        self
    }
}

impl From<&StoreConfig> for TableSpec {
    fn from(config: &StoreConfig) -> Self {
        Self {
            table: config.table.clone(),
            id_field: config.id_field.clone(),
            position_field: config.position_field.clone(),
        }
    }
}

/// One page of a sorted listing
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub data: Vec<Row>,
    /// Rows in the whole table
    pub total: u64,
    /// 1-indexed page number
    pub page: usize,
    pub page_size: usize,
}

/// Add/remove/patch/sort over a single remote table.
///
/// Nothing is cached: every call re-queries the store.
pub struct TableManager {
    store: StoreRef,
    spec: TableSpec,
}

impl TableManager {
    pub fn new(store: StoreRef, spec: TableSpec) -> Self {
        Self { store, spec }
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    fn table(&self) -> &str {
        &self.spec.table
    }

    // ==================== Positions ====================

    /// Position for a row inserted at `index`, or `None` without a position column
    pub async fn compute_insert_position(&self, index: InsertIndex) -> CoreResult<Option<f64>> {
        let Some(field) = self.spec.position_field.as_deref() else {
            return Ok(None);
        };
        PositionAllocator::new(self.store.as_ref(), self.table(), field)
            .position_for(index)
            .await
            .map(Some)
    }

    // ==================== Add ====================

    /// Insert a row at `index` and return it as stored
    pub async fn add_row(
        &self,
        data: RowInput,
        columns: Option<&[String]>,
        separator: &str,
        index: InsertIndex,
    ) -> CoreResult<Row> {
        let mut row = data.into_row(columns, separator)?;

        if let Some(position) = self.compute_insert_position(index).await? {
            if let Some(field) = &self.spec.position_field {
                row.insert(field.clone(), position_value(position)?);
            }
        }

        let res = self.store.insert(self.table(), &row).await?;
        log::info!(target: "moneygrowth::manager", "inserted row into {} at {}", self.table(), index);
        Ok(res.data.into_iter().next().unwrap_or_default())
    }

    // ==================== Remove ====================

    /// Delete the row with this id; 0 when nothing matched
    pub async fn remove_by_id(&self, id: impl Into<Value>) -> CoreResult<u64> {
        let filter = Filter::eq(self.spec.id_field.clone(), id);
        let removed = self.store.delete(self.table(), &[filter]).await?.affected();
        log::info!(target: "moneygrowth::manager", "removed {} row(s) by id", removed);
        Ok(removed)
    }

    /// Delete the rows at logical indexes `start..=end` (in either order)
    pub async fn remove_by_range(&self, start_index: usize, end_index: usize) -> CoreResult<u64> {
        let (start, end) = if start_index > end_index {
            (end_index, start_index)
        } else {
            (start_index, end_index)
        };

        let id_field = self.spec.id_field.as_str();
        let order_field = self.spec.position_field.as_deref().unwrap_or(id_field);
        let query = Query::new()
            .columns([id_field])
            .order(order_field, false)
            .range(start, end);

        let ids: Vec<Value> = self
            .store
            .select(self.table(), &query)
            .await?
            .data
            .into_iter()
            .filter_map(|mut row| row.remove(id_field))
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let filter = Filter::in_set(id_field, ids);
        let removed = self.store.delete(self.table(), &[filter]).await?.affected();
        log::info!(target: "moneygrowth::manager", "removed {} row(s) in range {}..={}", removed, start, end);
        Ok(removed)
    }

    /// Delete rows whose `column` matches, or null that cell when `clear_cell` is set
    pub async fn remove_by_regex(&self, pattern: &str, column: &str, clear_cell: bool) -> CoreResult<u64> {
        let filter = Filter::regex(column, pattern);
        let affected = if clear_cell {
            let mut patch = Row::new();
            patch.insert(column.to_string(), Value::Null);
            self.store.update(self.table(), &patch, &[filter]).await?.affected()
        } else {
            self.store.delete(self.table(), &[filter]).await?.affected()
        };
        log::info!(
            target: "moneygrowth::manager",
            "{} {} row(s) matching /{}/ on {}",
            if clear_cell { "cleared" } else { "removed" },
            affected,
            pattern,
            column
        );
        Ok(affected)
    }

    // ==================== Patch ====================

    /// Set `column` on the row with this id
    pub async fn patch_by_id(&self, id: impl Into<Value>, column: &str, value: Value) -> CoreResult<u64> {
        let mut patch = Row::new();
        patch.insert(column.to_string(), value);
        let filter = Filter::eq(self.spec.id_field.clone(), id);
        Ok(self.store.update(self.table(), &patch, &[filter]).await?.affected())
    }

    /// Set `column` on every row whose `match_column` (default: `column`) matches
    pub async fn patch_by_regex(
        &self,
        pattern: &str,
        column: &str,
        value: Value,
        match_column: Option<&str>,
    ) -> CoreResult<u64> {
        let mut patch = Row::new();
        patch.insert(column.to_string(), value);
        let filter = Filter::regex(match_column.unwrap_or(column), pattern);
        Ok(self.store.update(self.table(), &patch, &[filter]).await?.affected())
    }

    // ==================== Read ====================

    /// One page ordered by `column`: newest first for "newest", oldest first otherwise
    pub async fn sort_by(&self, column: &str, method: &str, page: usize, page_size: usize) -> CoreResult<Page> {
        let invalid = || CoreError::InvalidPage { page, page_size };
        if page == 0 || page_size == 0 {
            return Err(invalid());
        }

        let descending = method.eq_ignore_ascii_case("newest");
        let start = (page - 1).checked_mul(page_size).ok_or_else(invalid)?;
        let end = start.checked_add(page_size - 1).ok_or_else(invalid)?;
        let query = Query::new()
            .order(column, descending)
            .range(start, end)
            .with_count();

        let res = self.store.select(self.table(), &query).await?;
        Ok(Page {
            total: res.affected(),
            data: res.data,
            page,
            page_size,
        })
    }

    /// `column` of the row with the highest `order_column`
    pub async fn latest_value(&self, column: &str, order_column: &str) -> CoreResult<Option<Value>> {
        let query = Query::new().columns([column]).order(order_column, true).limit(1);
        let res = self.store.select(self.table(), &query).await?;
        Ok(res.data.into_iter().next().and_then(|mut row| row.remove(column)))
    }

    /// Every row, unordered
    pub async fn fetch_all(&self) -> CoreResult<Vec<Row>> {
        Ok(self.store.select(self.table(), &Query::new()).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneygrowth_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    const T: &str = "transactions";

    fn manager_with(rows: Vec<Value>) -> (Arc<MemoryStore>, TableManager) {
        let store = Arc::new(MemoryStore::new());
        store.seed(T, rows);
        let manager = TableManager::new(store.clone(), TableSpec::new(T));
        (store, manager)
    }

    fn ten_rows() -> Vec<Value> {
        (1..=10)
            .map(|i| json!({"id": i, "position": i, "amount": i * 10, "note": format!("n{}", i)}))
            .collect()
    }

    fn ordered_ids(store: &MemoryStore) -> Vec<i64> {
        let mut rows = store.rows(T);
        rows.sort_by(|a, b| {
            let pa = a.get("position").and_then(Value::as_f64).unwrap_or(0.0);
            let pb = b.get("position").and_then(Value::as_f64).unwrap_or(0.0);
            pa.partial_cmp(&pb).unwrap()
        });
        rows.iter()
            .filter_map(|r| r.get("id"))
            .filter_map(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_add_mapping_appends() {
        let (store, manager) = manager_with(ten_rows());
        let row = json!({"id": 11, "note": "x"}).as_object().unwrap().clone();
        let inserted = manager
            .add_row(row.into(), None, ";", InsertIndex::Append)
            .await
            .unwrap();
        assert_eq!(inserted.get("position"), Some(&json!(11)));
        assert_eq!(ordered_ids(&store).last(), Some(&11));
    }

    #[tokio::test]
    async fn test_add_text_after_index() {
        let (store, manager) = manager_with(ten_rows());
        let inserted = manager
            .add_row("99;mid".into(), Some(&cols(&["id", "note"])), ";", "0+".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(inserted.get("position"), Some(&json!(1.5)));
        assert_eq!(&ordered_ids(&store)[..3], &[1, 99, 2]);
    }

    #[tokio::test]
    async fn test_add_without_columns_fails_before_request() {
        let (store, manager) = manager_with(ten_rows());
        let err = manager
            .add_row(vec![json!(1)].into(), None, ";", InsertIndex::Append)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ColumnsRequired));
        assert_eq!(store.rows(T).len(), 10);
    }

    #[tokio::test]
    async fn test_add_without_position_field() {
        let store = Arc::new(MemoryStore::new());
        let spec = TableSpec::new(T).with_position_field(None::<String>);
        let manager = TableManager::new(store.clone(), spec);
        assert_eq!(manager.compute_insert_position(InsertIndex::Append).await.unwrap(), None);

        let inserted = manager
            .add_row("5".into(), Some(&cols(&["id"])), ";", InsertIndex::After(3))
            .await
            .unwrap();
        assert!(!inserted.contains_key("position"));
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_id(3).await.unwrap(), 1);
        assert_eq!(manager.remove_by_id(3).await.unwrap(), 0);
        assert_eq!(manager.remove_by_id("404").await.unwrap(), 0);
        assert_eq!(store.rows(T).len(), 9);
    }

    #[tokio::test]
    async fn test_remove_by_range_is_symmetric() {
        let (store_a, manager_a) = manager_with(ten_rows());
        let (store_b, manager_b) = manager_with(ten_rows());

        assert_eq!(manager_a.remove_by_range(2, 4).await.unwrap(), 3);
        assert_eq!(manager_b.remove_by_range(4, 2).await.unwrap(), 3);
        assert_eq!(ordered_ids(&store_a), vec![1, 2, 6, 7, 8, 9, 10]);
        assert_eq!(ordered_ids(&store_a), ordered_ids(&store_b));
    }

    #[tokio::test]
    async fn test_remove_by_range_past_end() {
        let (_, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_range(20, 30).await.unwrap(), 0);
        assert_eq!(manager.remove_by_range(8, 30).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_by_regex() {
        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_regex("^n1", "note", false).await.unwrap(), 2);
        assert_eq!(store.rows(T).len(), 8);
        assert_eq!(manager.remove_by_regex("^zzz", "note", false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_by_regex_clears_cell() {
        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_regex("^n[23]$", "note", true).await.unwrap(), 2);
        let rows = store.rows(T);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows.iter().filter(|r| r.get("note") == Some(&Value::Null)).count(), 2);
    }

    #[tokio::test]
    async fn test_patch_by_id() {
        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.patch_by_id(2, "note", json!("fixed")).await.unwrap(), 1);
        assert_eq!(manager.patch_by_id(200, "note", json!("fixed")).await.unwrap(), 0);
        let row = store.rows(T).into_iter().find(|r| r.get("id") == Some(&json!(2))).unwrap();
        assert_eq!(row.get("note"), Some(&json!("fixed")));
    }

    #[tokio::test]
    async fn test_patch_by_regex_with_match_column() {
        let (store, manager) = manager_with(ten_rows());
        let patched = manager
            .patch_by_regex("^(1|2)0$", "note", json!("small"), Some("amount"))
            .await
            .unwrap();
        assert_eq!(patched, 2);
        let small = store.rows(T).iter().filter(|r| r.get("note") == Some(&json!("small"))).count();
        assert_eq!(small, 2);

        let patched = manager.patch_by_regex("^small$", "note", json!("tiny"), None).await.unwrap();
        assert_eq!(patched, 2);
    }

    #[tokio::test]
    async fn test_sort_by_newest_and_oldest() {
        let (_, manager) = manager_with(ten_rows());

        let page = manager.sort_by("amount", "Newest", 1, 4).await.unwrap();
        let amounts: Vec<i64> = page.data.iter().filter_map(|r| r["amount"].as_i64()).collect();
        assert_eq!(amounts, vec![100, 90, 80, 70]);
        assert!(amounts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(page.total, 10);
        assert_eq!((page.page, page.page_size), (1, 4));

        let page = manager.sort_by("amount", "Oldest", 3, 4).await.unwrap();
        let amounts: Vec<i64> = page.data.iter().filter_map(|r| r["amount"].as_i64()).collect();
        assert_eq!(amounts, vec![90, 100]);

        let page = manager.sort_by("amount", "whatever", 1, 3).await.unwrap();
        let amounts: Vec<i64> = page.data.iter().filter_map(|r| r["amount"].as_i64()).collect();
        assert!(amounts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_sort_by_rejects_page_zero() {
        let (_, manager) = manager_with(ten_rows());
        assert!(matches!(
            manager.sort_by("amount", "newest", 0, 10).await,
            Err(CoreError::InvalidPage { .. })
        ));
        assert!(matches!(
            manager.sort_by("amount", "newest", 1, 0).await,
            Err(CoreError::InvalidPage { .. })
        ));
    }

    #[tokio::test]
    async fn test_sort_by_rejects_unaddressable_page() {
        let (_, manager) = manager_with(ten_rows());
        assert!(matches!(
            manager.sort_by("id", "oldest", usize::MAX, 2).await,
            Err(CoreError::InvalidPage { .. })
        ));
        let page = manager.sort_by("id", "oldest", 1, usize::MAX).await.unwrap();
        assert_eq!(page.data.len(), 10);
    }

    #[tokio::test]
    async fn test_remove_by_range_to_usize_max() {
        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_range(2, usize::MAX).await.unwrap(), 8);
        assert_eq!(ordered_ids(&store), vec![1, 2]);

        let (store, manager) = manager_with(ten_rows());
        assert_eq!(manager.remove_by_range(usize::MAX, 7).await.unwrap(), 3);
        assert_eq!(ordered_ids(&store), (1..=7).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_add_after_largest_index_appends() {
        let (store, manager) = manager_with(ten_rows());
        let index: InsertIndex = format!("{}+", usize::MAX).parse().unwrap();
        let inserted = manager
            .add_row(json!({"id": 11}).as_object().unwrap().clone().into(), None, ";", index)
            .await
            .unwrap();
        assert_eq!(inserted.get("position"), Some(&json!(11)));
        assert_eq!(ordered_ids(&store).last(), Some(&11));
    }

    #[tokio::test]
    async fn test_latest_value_and_fetch_all() {
        let (_, manager) = manager_with(ten_rows());
        assert_eq!(manager.latest_value("amount", "id").await.unwrap(), Some(json!(100)));
        assert_eq!(manager.fetch_all().await.unwrap().len(), 10);

        let (_, empty) = manager_with(vec![]);
        assert_eq!(empty.latest_value("amount", "id").await.unwrap(), None);
    }

    #[test]
    fn test_spec_from_config() {
        let config = StoreConfig::default();
        let spec = TableSpec::from(&config);
        assert_eq!(spec.table, "transactions");
        assert_eq!(spec.position_field.as_deref(), Some("id"));
    }
}
