//! Live database catalog adapters for schema reconciliation
//!
//! This crate provides adapters that read table metadata (columns, foreign
//! keys, indexes) from a live database through its catalog views.
//!
//! ## Features
//!
//! Enable database support via Cargo features:
//! - `postgres` - PostgreSQL support
//! - `mysql` - MySQL / MariaDB support
//! - `all-databases` - All database adapters
//!
//! [`MockCatalog`] is always available for tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modeldrift_catalog::{CatalogAdapter, PostgresAdapter};
//!
//! let adapter = PostgresAdapter::connect("host=localhost dbname=app user=postgres", "public").await?;
//! let columns = adapter.describe_table("users").await?;
//! ```

pub mod adapter;
pub mod mock;
pub mod mysql;
pub mod postgres;

pub use adapter::{CatalogAdapter, CatalogError};
pub use mock::{CatalogCall, MockCatalog, MockTable};
pub use mysql::MySqlAdapter;
pub use postgres::{PostgresAdapter, DEFAULT_SCHEMA};
