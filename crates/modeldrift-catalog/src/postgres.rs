//! PostgreSQL catalog adapter using information_schema and pg_catalog
//!
//! Column types are rendered in canonical upper-case form so that they can be
//! compared verbatim with the type mapper's output:
//! - `character varying` with a length becomes `CHARACTER VARYING(n)`
//! - `numeric(p,s)` becomes `DECIMAL(p,s)`
//! - `double precision` becomes `FLOAT`
//! - enum types become `ENUM('a','b')` with labels in sort order
//! - everything else is `upper(data_type)`, e.g. `TIMESTAMP WITH TIME ZONE`
//!
//! ## Usage
//!
//! ```rust,ignore
//! let adapter = PostgresAdapter::connect(
//!     "host=localhost port=5432 dbname=mydb user=postgres password=secret",
//!     "public",
//! ).await?;
//!
//! // With TLS
//! let adapter = PostgresAdapter::connect_with_tls(conn_str, "public").await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use modeldrift_core::{Dialect, IntrospectedForeignKey, IntrospectedIndex, TableDescription};

#[cfg(feature = "postgres")]
use crate::adapter::group_index_rows;

#[cfg(feature = "postgres")]
use modeldrift_core::IntrospectedColumn;

#[cfg(feature = "postgres")]
use tokio_postgres::{Client, Config as PgConfig, NoTls};

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

/// Default schema introspected when none is configured
pub const DEFAULT_SCHEMA: &str = "public";

#[cfg(any(feature = "postgres", test))]
pub(crate) const TABLES_QUERY: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema::text = $1
      AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

#[cfg(any(feature = "postgres", test))]
pub(crate) const COLUMNS_QUERY: &str = r#"
    SELECT
        c.column_name::text AS field,
        CASE
            WHEN c.data_type = 'character varying' AND c.character_maximum_length IS NOT NULL
                THEN 'CHARACTER VARYING(' || c.character_maximum_length || ')'
            WHEN c.data_type = 'character'
                THEN 'CHAR(' || COALESCE(c.character_maximum_length, 1) || ')'
            WHEN c.data_type = 'numeric' AND c.numeric_precision IS NOT NULL
                THEN 'DECIMAL(' || c.numeric_precision || ',' || COALESCE(c.numeric_scale, 0) || ')'
            WHEN c.data_type = 'numeric' THEN 'DECIMAL'
            WHEN c.data_type = 'double precision' THEN 'FLOAT'
            WHEN c.data_type = 'USER-DEFINED' AND e.labels IS NOT NULL
                THEN 'ENUM(' || e.labels || ')'
            WHEN c.data_type = 'USER-DEFINED' THEN upper(c.udt_name::text)
            ELSE upper(c.data_type::text)
        END AS column_type,
        c.is_nullable = 'YES' AS nullable,
        c.column_default::text AS default_value,
        col_description(
            format('%I.%I', c.table_schema, c.table_name)::regclass,
            c.ordinal_position::int
        ) AS comment,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_name = tc.constraint_name
             AND kcu.table_schema = tc.table_schema
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS primary_key
    FROM information_schema.columns c
    LEFT JOIN LATERAL (
        SELECT string_agg(quote_literal(en.enumlabel::text), ',' ORDER BY en.enumsortorder) AS labels
        FROM pg_type t
        JOIN pg_namespace tn ON tn.oid = t.typnamespace
        JOIN pg_enum en ON en.enumtypid = t.oid
        WHERE t.typname::text = c.udt_name::text
          AND tn.nspname::text = c.udt_schema::text
    ) e ON true
    WHERE c.table_schema::text = $1
      AND c.table_name::text = $2
    ORDER BY c.ordinal_position
"#;

#[cfg(any(feature = "postgres", test))]
pub(crate) const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT
        quote_ident(kcu.column_name::text) AS from_column,
        ccu.table_name::text AS to_table,
        ccu.column_name::text AS to_column
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage ccu
      ON ccu.constraint_name = tc.constraint_name
     AND ccu.table_schema = tc.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY'
      AND tc.table_schema::text = $1
      AND tc.table_name::text = $2
    ORDER BY kcu.column_name
"#;

#[cfg(any(feature = "postgres", test))]
pub(crate) const INDEXES_QUERY: &str = r#"
    SELECT
        i.relname::text AS index_name,
        a.attname::text AS column_name,
        ix.indisunique AS is_unique,
        ix.indisprimary AS is_primary
    FROM pg_index ix
    JOIN pg_class t ON t.oid = ix.indrelid
    JOIN pg_class i ON i.oid = ix.indexrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, position) ON true
    JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
    WHERE n.nspname::text = $1
      AND t.relname::text = $2
    ORDER BY i.relname, k.position
"#;

/// PostgreSQL catalog adapter
///
/// A single client is shared by all concurrent table checks; tokio-postgres
/// pipelines the queries over one connection.
pub struct PostgresAdapter {
    /// PostgreSQL client (only available with postgres feature)
    #[cfg(feature = "postgres")]
    client: Client,

    /// Schema being introspected
    schema: String,

    /// Database name
    database: String,
}

#[cfg(not(feature = "postgres"))]
fn not_compiled() -> CatalogError {
    CatalogError::ConfigError(
        "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres".to_string(),
    )
}

impl PostgresAdapter {
    /// Connect without TLS using a connection string
    /// (`host=... port=... dbname=... user=...` or a `postgres://` URL)
    #[cfg(feature = "postgres")]
    pub async fn connect(conn_str: &str, schema: impl Into<String>) -> Result<Self, CatalogError> {
        let database = Self::database_name(conn_str)?;

        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| CatalogError::ConnectionError(format!("Failed to connect: {}", e)))?;

        let db = database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(database = %db, error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self {
            client,
            schema: schema.into(),
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(_conn_str: &str, _schema: impl Into<String>) -> Result<Self, CatalogError> {
        Err(not_compiled())
    }

    /// Connect with TLS using a connection string
    #[cfg(feature = "postgres")]
    pub async fn connect_with_tls(conn_str: &str, schema: impl Into<String>) -> Result<Self, CatalogError> {
        let database = Self::database_name(conn_str)?;

        let connector = TlsConnector::builder()
            .build()
            .map_err(|e| CatalogError::ConfigError(format!("Failed to create TLS connector: {}", e)))?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(conn_str, tls)
            .await
            .map_err(|e| CatalogError::ConnectionError(format!("Failed to connect with TLS: {}", e)))?;

        let db = database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(database = %db, error = %e, "PostgreSQL TLS connection error");
            }
        });

        Ok(Self {
            client,
            schema: schema.into(),
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect_with_tls(_conn_str: &str, _schema: impl Into<String>) -> Result<Self, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(feature = "postgres")]
    fn database_name(conn_str: &str) -> Result<String, CatalogError> {
        let config: PgConfig = conn_str
            .parse()
            .map_err(|e| CatalogError::ConfigError(format!("Invalid connection string: {}", e)))?;
        Ok(config.get_dbname().unwrap_or("postgres").to_string())
    }

    /// Schema being introspected
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Connected database name
    pub fn database(&self) -> &str {
        &self.database
    }

    #[cfg(feature = "postgres")]
    async fn query(&self, sql: &str, table: Option<&str>) -> Result<Vec<tokio_postgres::Row>, CatalogError> {
        let result = match table {
            Some(table) => self.client.query(sql, &[&self.schema, &table]).await,
            None => self.client.query(sql, &[&self.schema]).await,
        };

        result.map_err(|e| {
            let err_str = e.to_string();
            let target = table.unwrap_or(&self.schema);
            if err_str.contains("does not exist") {
                CatalogError::TableNotFound(format!("{}.{}", self.schema, target))
            } else if err_str.contains("permission denied") {
                CatalogError::PermissionDenied(format!("Cannot access {}: {}", target, err_str))
            } else {
                CatalogError::QueryError(err_str)
            }
        })
    }
}

#[cfg(feature = "postgres")]
fn invalid(e: tokio_postgres::Error) -> CatalogError {
    CatalogError::InvalidResponse(e.to_string())
}

#[async_trait::async_trait]
impl CatalogAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    #[cfg(feature = "postgres")]
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        self.query(TABLES_QUERY, None)
            .await?
            .iter()
            .map(|row| row.try_get::<_, String>(0).map_err(invalid))
            .collect()
    }

    #[cfg(feature = "postgres")]
    async fn describe_table(&self, table: &str) -> Result<TableDescription, CatalogError> {
        let rows = self.query(COLUMNS_QUERY, Some(table)).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let mut column = IntrospectedColumn::new(
                row.try_get::<_, String>("field").map_err(invalid)?,
                row.try_get::<_, String>("column_type").map_err(invalid)?,
            );
            column.nullable = row.try_get("nullable").map_err(invalid)?;
            column.primary_key = row.try_get("primary_key").map_err(invalid)?;
            column.default_value = row.try_get("default_value").map_err(invalid)?;
            column.comment = row
                .try_get::<_, Option<String>>("comment")
                .map_err(invalid)?
                .filter(|c| !c.is_empty());
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(CatalogError::TableNotFound(format!(
                "Table {}.{} not found or has no columns",
                self.schema, table
            )));
        }

        Ok(TableDescription::from_columns(columns))
    }

    #[cfg(feature = "postgres")]
    async fn list_foreign_keys(&self, table: &str) -> Result<Vec<IntrospectedForeignKey>, CatalogError> {
        self.query(FOREIGN_KEYS_QUERY, Some(table))
            .await?
            .iter()
            .map(|row| {
                Ok(IntrospectedForeignKey::new(
                    row.try_get::<_, String>("from_column").map_err(invalid)?,
                    row.try_get::<_, String>("to_table").map_err(invalid)?,
                    row.try_get::<_, String>("to_column").map_err(invalid)?,
                ))
            })
            .collect()
    }

    #[cfg(feature = "postgres")]
    async fn list_indexes(&self, table: &str) -> Result<Vec<IntrospectedIndex>, CatalogError> {
        let rows = self.query(INDEXES_QUERY, Some(table)).await?;

        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            tuples.push((
                row.try_get::<_, String>("index_name").map_err(invalid)?,
                row.try_get::<_, String>("column_name").map_err(invalid)?,
                row.try_get::<_, bool>("is_unique").map_err(invalid)?,
                row.try_get::<_, bool>("is_primary").map_err(invalid)?,
            ));
        }

        Ok(group_index_rows(tuples))
    }

    #[cfg(feature = "postgres")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| CatalogError::ConnectionError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn describe_table(&self, _table: &str) -> Result<TableDescription, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_foreign_keys(&self, _table: &str) -> Result<Vec<IntrospectedForeignKey>, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_indexes(&self, _table: &str) -> Result<Vec<IntrospectedIndex>, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(not_compiled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_are_parameterized_by_schema_and_table() {
        for query in [COLUMNS_QUERY, FOREIGN_KEYS_QUERY, INDEXES_QUERY] {
            assert!(query.contains("$1"));
            assert!(query.contains("$2"));
        }
        assert!(TABLES_QUERY.contains("$1"));
        assert!(!TABLES_QUERY.contains("$2"));
    }

    #[test]
    fn columns_query_renders_canonical_tokens() {
        assert!(COLUMNS_QUERY.contains("'CHARACTER VARYING('"));
        assert!(COLUMNS_QUERY.contains("'DECIMAL('"));
        assert!(COLUMNS_QUERY.contains("'ENUM('"));
        assert!(COLUMNS_QUERY.contains("upper(c.data_type::text)"));
    }
}
