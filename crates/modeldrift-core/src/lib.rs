//! modeldrift core
//!
//! Core domain model with stable, versioned types.
//! Never rename discrepancy codes - they are part of the public API.

pub mod catalog;
pub mod config;
pub mod dialect;
pub mod discrepancy;
pub mod model;
pub mod report;

pub use catalog::{IntrospectedColumn, IntrospectedForeignKey, IntrospectedIndex, TableDescription};
pub use config::{Config, ConfigError, DatabaseConfig, ValidationMode, ValidationOptions, DEFAULT_MIGRATIONS_TABLE};
pub use dialect::{unquote_identifier, Dialect, UnknownDialect};
pub use discrepancy::{Discrepancy, DiscrepancyKind};
pub use model::{
    AttributeDefinition, ColumnType, IndexDefinition, ModelDefinition, ModelError, ModelRegistry, Reference,
    TextSize, Uniqueness,
};
pub use report::{Report, ReportSummary, ReportVersion};
