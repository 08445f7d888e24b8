//! Mock catalog adapter for testing
//!
//! This adapter serves predefined table metadata without connecting to any
//! database. It's useful for:
//! - Unit testing the reconciliation checkers
//! - Simulating out-of-band migrations between runs
//! - Simulating catalog failures for specific tables
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modeldrift_catalog::{CatalogAdapter, MockCatalog, MockTable};
//! use modeldrift_core::{Dialect, IntrospectedColumn};
//!
//! let catalog = MockCatalog::new(Dialect::Postgres).with_table(
//!     "users",
//!     MockTable::new(vec![IntrospectedColumn::new("id", "INTEGER").with_primary_key()]),
//! );
//!
//! let columns = catalog.describe_table("users").await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use modeldrift_core::{
    Dialect, IntrospectedColumn, IntrospectedForeignKey, IntrospectedIndex, TableDescription,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Catalog state of one mocked table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockTable {
    pub description: TableDescription,
    pub foreign_keys: Vec<IntrospectedForeignKey>,
    pub indexes: Vec<IntrospectedIndex>,
}

impl MockTable {
    /// Create a table from its columns; a primary index is derived from
    /// the primary-key columns
    pub fn new(columns: Vec<IntrospectedColumn>) -> Self {
        let primary: Vec<String> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.field.clone())
            .collect();

        let indexes = if primary.is_empty() {
            Vec::new()
        } else {
            vec![IntrospectedIndex::primary(primary)]
        };

        Self {
            description: TableDescription::from_columns(columns),
            foreign_keys: Vec::new(),
            indexes,
        }
    }

    pub fn with_foreign_key(mut self, fk: IntrospectedForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn with_index(mut self, index: IntrospectedIndex) -> Self {
        self.indexes.push(index);
        self
    }
}

/// Catalog operation, for call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogCall {
    ListTables,
    DescribeTable,
    ListForeignKeys,
    ListIndexes,
}

/// Mock catalog adapter for testing
///
/// Tables are stored in memory and can be altered between runs to mimic
/// migrations that were applied out-of-band.
pub struct MockCatalog {
    dialect: Dialect,

    tables: RwLock<BTreeMap<String, MockTable>>,

    /// Errors to return for specific tables
    errors: RwLock<HashMap<String, CatalogError>>,

    /// Recorded (operation, table) calls; table is empty for `ListTables`
    calls: Mutex<Vec<(CatalogCall, String)>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Queries currently inside their simulated latency
    in_flight: AtomicUsize,

    /// Highest value `in_flight` has reached
    peak_in_flight: AtomicUsize,
}

impl MockCatalog {
    /// Create an empty mock catalog for a dialect
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: RwLock::new(BTreeMap::new()),
            errors: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_connection: false,
            latency_ms: 0,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Add a table while building the mock
    pub fn with_table(mut self, name: impl Into<String>, table: MockTable) -> Self {
        self.tables.get_mut().insert(name.into(), table);
        self
    }

    /// Configure to fail every operation with a connection error
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Add or replace a table
    pub async fn add_table(&self, name: impl Into<String>, table: MockTable) {
        self.tables.write().await.insert(name.into(), table);
    }

    /// Mutate a table in place, as a migration would
    pub async fn alter_table<F>(&self, name: &str, alter: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut MockTable),
    {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(name)
            .ok_or_else(|| CatalogError::TableNotFound(name.to_string()))?;
        alter(table);
        Ok(())
    }

    /// Configure an error to be returned for every query on a table
    pub async fn add_error_for_table(&self, table: impl Into<String>, error: CatalogError) {
        self.errors.write().await.insert(table.into(), error);
    }

    /// Number of recorded calls of one kind
    pub async fn call_count(&self, call: CatalogCall) -> usize {
        self.calls.lock().await.iter().filter(|(c, _)| *c == call).count()
    }

    /// Whether any per-table query touched `table`
    pub async fn was_queried(&self, table: &str) -> bool {
        self.calls
            .lock()
            .await
            .iter()
            .any(|(c, t)| *c != CatalogCall::ListTables && t == table)
    }

    /// Most queries that were ever in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Forget recorded calls
    pub async fn reset_calls(&self) {
        self.calls.lock().await.clear();
        self.peak_in_flight.store(0, Ordering::SeqCst);
    }

    async fn enter(&self, call: CatalogCall, table: &str) -> Result<(), CatalogError> {
        self.calls.lock().await.push((call, table.to_string()));

        {
            let _gauge = InFlight::enter(&self.in_flight, &self.peak_in_flight);
            if self.latency_ms > 0 {
                tokio::time::sleep(tokio::time::Duration::from_millis(self.latency_ms)).await;
            }
        }

        if self.fail_connection {
            return Err(CatalogError::ConnectionError(
                "Simulated connection failure".to_string(),
            ));
        }

        if let Some(error) = self.errors.read().await.get(table) {
            return Err(error.clone());
        }

        Ok(())
    }

    async fn table(&self, name: &str) -> Result<MockTable, CatalogError> {
        self.tables
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(name.to_string()))
    }
}

/// Counts a query as in flight until dropped, including when the caller
/// abandons it mid-latency
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(in_flight: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(running, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        self.enter(CatalogCall::ListTables, "").await?;
        Ok(self.tables.read().await.keys().cloned().collect())
    }

    async fn describe_table(&self, table: &str) -> Result<TableDescription, CatalogError> {
        self.enter(CatalogCall::DescribeTable, table).await?;
        Ok(self.table(table).await?.description)
    }

    async fn list_foreign_keys(&self, table: &str) -> Result<Vec<IntrospectedForeignKey>, CatalogError> {
        self.enter(CatalogCall::ListForeignKeys, table).await?;
        if !self.dialect.supports_foreign_key_introspection() {
            return Err(CatalogError::Unsupported(format!(
                "foreign-key introspection is not available for {}",
                self.dialect
            )));
        }
        Ok(self.table(table).await?.foreign_keys)
    }

    async fn list_indexes(&self, table: &str) -> Result<Vec<IntrospectedIndex>, CatalogError> {
        self.enter(CatalogCall::ListIndexes, table).await?;
        Ok(self.table(table).await?.indexes)
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        if self.fail_connection {
            return Err(CatalogError::ConnectionError(
                "Simulated connection failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> MockTable {
        MockTable::new(vec![
            IntrospectedColumn::new("id", "INTEGER").with_primary_key(),
            IntrospectedColumn::new("email", "CHARACTER VARYING(255)"),
        ])
        .with_index(IntrospectedIndex::unique(["email"]))
    }

    #[tokio::test]
    async fn serves_tables_and_derives_primary_index() {
        let catalog = MockCatalog::new(Dialect::Postgres).with_table("users", users());

        assert_eq!(catalog.list_tables().await.unwrap(), vec!["users"]);
        assert_eq!(catalog.describe_table("users").await.unwrap().columns.len(), 2);

        let indexes = catalog.list_indexes("users").await.unwrap();
        assert_eq!(indexes.len(), 2);
        assert!(indexes[0].primary);
        assert_eq!(indexes[0].fields, vec!["id"]);
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let catalog = MockCatalog::new(Dialect::Postgres);
        assert!(matches!(
            catalog.describe_table("nope").await,
            Err(CatalogError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn foreign_keys_unsupported_on_mysql() {
        let catalog = MockCatalog::new(Dialect::MySql).with_table("users", users());
        assert!(matches!(
            catalog.list_foreign_keys("users").await,
            Err(CatalogError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn alter_and_error_injection() {
        let catalog = MockCatalog::new(Dialect::Postgres).with_table("users", users());

        catalog
            .alter_table("users", |t| {
                t.description.columns.push(IntrospectedColumn::new("age", "INTEGER"));
            })
            .await
            .unwrap();
        assert!(catalog.describe_table("users").await.unwrap().column("age").is_some());

        catalog
            .add_error_for_table("users", CatalogError::PermissionDenied("users".into()))
            .await;
        assert!(matches!(
            catalog.list_indexes("users").await,
            Err(CatalogError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn records_calls() {
        let catalog = MockCatalog::new(Dialect::Postgres).with_table("users", users());
        catalog.list_tables().await.unwrap();
        catalog.describe_table("users").await.unwrap();

        assert_eq!(catalog.call_count(CatalogCall::ListTables).await, 1);
        assert!(catalog.was_queried("users").await);
        assert!(!catalog.was_queried("orders").await);

        catalog.reset_calls().await;
        assert!(!catalog.was_queried("users").await);
    }

    #[tokio::test]
    async fn tracks_peak_in_flight_queries() {
        let catalog = MockCatalog::new(Dialect::Postgres).with_table("users", users()).with_latency(5);

        catalog.describe_table("users").await.unwrap();
        assert_eq!(catalog.peak_in_flight(), 1);

        let (a, b, c) = tokio::join!(
            catalog.describe_table("users"),
            catalog.list_indexes("users"),
            catalog.list_foreign_keys("users"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(catalog.peak_in_flight(), 3);

        catalog.reset_calls().await;
        assert_eq!(catalog.peak_in_flight(), 0);
    }

    #[tokio::test]
    async fn connection_failure() {
        let catalog = MockCatalog::new(Dialect::Postgres).with_connection_failure();
        assert!(catalog.test_connection().await.is_err());
        assert!(matches!(
            catalog.list_tables().await,
            Err(CatalogError::ConnectionError(_))
        ));
    }
}
