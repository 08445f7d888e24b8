//! Catalog adapter trait for introspecting live table metadata

use modeldrift_core::{Dialect, IntrospectedForeignKey, IntrospectedIndex, TableDescription};

/// Errors that can occur when querying the catalog
///
/// These are fatal for a validation run; they are never turned into
/// discrepancies.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for database catalogs that can be introspected
///
/// Every method is a read-only query against the live database.
#[async_trait::async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Get the adapter name (e.g., "PostgreSQL", "MySQL")
    fn name(&self) -> &'static str;

    /// Dialect family of the connected database
    fn dialect(&self) -> Dialect;

    /// List base tables visible in the configured schema
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError>;

    /// Describe the columns of a table, in ordinal order
    async fn describe_table(&self, table: &str) -> Result<TableDescription, CatalogError>;

    /// List foreign-key constraints declared on a table
    ///
    /// Adapters for dialects without foreign-key introspection return
    /// [`CatalogError::Unsupported`].
    async fn list_foreign_keys(&self, table: &str) -> Result<Vec<IntrospectedForeignKey>, CatalogError>;

    /// List indexes on a table, including the primary index
    async fn list_indexes(&self, table: &str) -> Result<Vec<IntrospectedIndex>, CatalogError>;

    /// Test the connection to the database
    async fn test_connection(&self) -> Result<(), CatalogError>;
}

/// Group `(index, column)` rows ordered by index then position into indexes
#[cfg(any(feature = "postgres", feature = "mysql", test))]
pub(crate) fn group_index_rows<I>(rows: I) -> Vec<IntrospectedIndex>
where
    I: IntoIterator<Item = (String, String, bool, bool)>,
{
    let mut indexes: Vec<IntrospectedIndex> = Vec::new();

    for (index_name, column, unique, primary) in rows {
        match indexes.last_mut() {
            Some(last) if last.name.as_deref() == Some(index_name.as_str()) => {
                last.fields.push(column);
            }
            _ => {
                let mut index = IntrospectedIndex::new([column]).with_name(index_name);
                index.unique = unique;
                index.primary = primary;
                indexes.push(index);
            }
        }
    }

    indexes
}
