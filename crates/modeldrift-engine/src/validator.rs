//! Reconciliation orchestrator
//!
//! Lists the catalog's tables, drops excluded ones, and reconciles each
//! remaining table against its model: attributes, then foreign keys, then
//! indexes. Tables are processed concurrently through an ordered, bounded
//! stream so results always come back in table-name order.

use futures::stream::{self, StreamExt};
use modeldrift_catalog::{CatalogAdapter, CatalogError};
use modeldrift_core::{Discrepancy, ModelRegistry, Report, ValidationMode, ValidationOptions};

use crate::attributes::check_attributes;
use crate::foreign_keys::check_foreign_keys;
use crate::indexes::check_indexes;

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRun {
    /// Tables reconciled (including those without a model)
    pub tables_checked: usize,

    /// Tables skipped by the exclusion list
    pub tables_excluded: usize,

    /// Discrepancies in table order
    pub discrepancies: Vec<Discrepancy>,
}

impl ValidationRun {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Convert into a versioned report
    pub fn into_report(self, dialect: modeldrift_core::Dialect) -> Report {
        Report::from_discrepancies(dialect, self.discrepancies, self.tables_checked, self.tables_excluded)
    }
}

/// Why a validation did not succeed
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// First discrepancy found (fail-fast mode)
    #[error("Schema validation failed: {0}")]
    Discrepancy(Box<Discrepancy>),

    /// Every discrepancy found (full-report mode)
    #[error("Schema validation failed with {} discrepancies:\n{}", .0.len(), render_all(.0))]
    Discrepancies(Vec<Discrepancy>),

    /// Catalog I/O failure; never turned into a discrepancy
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl ValidationError {
    /// Discrepancies carried by this error, empty for catalog failures
    pub fn discrepancies(&self) -> &[Discrepancy] {
        match self {
            Self::Discrepancy(d) => std::slice::from_ref(d.as_ref()),
            Self::Discrepancies(all) => all,
            Self::Catalog(_) => &[],
        }
    }
}

fn render_all(discrepancies: &[Discrepancy]) -> String {
    discrepancies
        .iter()
        .map(|d| format!("  {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reconciles every table of a catalog against a model registry
pub struct SchemaValidator<'a> {
    catalog: &'a dyn CatalogAdapter,
    registry: &'a ModelRegistry,
    options: ValidationOptions,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(catalog: &'a dyn CatalogAdapter, registry: &'a ModelRegistry, options: ValidationOptions) -> Self {
        if catalog.dialect() != options.dialect {
            tracing::warn!(
                catalog = %catalog.dialect(),
                configured = %options.dialect,
                "Configured dialect differs from the catalog's dialect"
            );
        }

        Self {
            catalog,
            registry,
            options,
        }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Run the reconciliation and return what was found
    ///
    /// In fail-fast mode the run stops after the first table with a
    /// discrepancy; catalog errors abort the run in both modes.
    pub async fn collect(&self) -> Result<ValidationRun, CatalogError> {
        let mut tables = self.catalog.list_tables().await?;
        tables.sort();
        tables.dedup();

        let (excluded, tables): (Vec<String>, Vec<String>) =
            tables.into_iter().partition(|t| self.options.is_excluded(t));
        if !excluded.is_empty() {
            tracing::debug!(tables = ?excluded, "Excluded tables");
        }

        let fail_fast = self.options.mode == ValidationMode::FailFast;
        let mut run = ValidationRun {
            tables_excluded: excluded.len(),
            ..ValidationRun::default()
        };

        let mut results = stream::iter(tables.iter())
            .map(|table| self.check_table(table, fail_fast))
            .buffered(self.options.max_concurrency.max(1));

        while let Some(result) = results.next().await {
            let found = result?;
            run.tables_checked += 1;
            if found.is_empty() {
                continue;
            }
            run.discrepancies.extend(found);
            if fail_fast {
                break;
            }
        }

        tracing::info!(
            dialect = %self.options.dialect,
            checked = run.tables_checked,
            excluded = run.tables_excluded,
            discrepancies = run.discrepancies.len(),
            "Schema validation finished"
        );

        Ok(run)
    }

    /// Run the reconciliation and fail on any discrepancy
    pub async fn validate(&self) -> Result<ValidationRun, ValidationError> {
        let mut run = self.collect().await?;
        if run.is_clean() {
            return Ok(run);
        }

        let discrepancies = std::mem::take(&mut run.discrepancies);
        match self.options.mode {
            ValidationMode::FailFast => match discrepancies.into_iter().next() {
                Some(first) => Err(ValidationError::Discrepancy(Box::new(first))),
                None => Ok(run),
            },
            ValidationMode::FullReport => Err(ValidationError::Discrepancies(discrepancies)),
        }
    }

    async fn check_table(&self, table: &str, fail_fast: bool) -> Result<Vec<Discrepancy>, CatalogError> {
        let Some(model) = self.registry.resolve_model(table) else {
            tracing::debug!(table, "No model defined");
            return Ok(vec![Discrepancy::undefined_model(table)]);
        };

        tracing::debug!(table, "Checking attributes");
        let columns = self.catalog.describe_table(table).await?;
        let mut found = check_attributes(table, model, &columns, &self.options);
        if fail_fast && !found.is_empty() {
            return Ok(found);
        }

        if self.options.dialect.supports_foreign_key_introspection() {
            tracing::debug!(table, "Checking foreign keys");
            let foreign_keys = self.catalog.list_foreign_keys(table).await?;
            found.extend(check_foreign_keys(table, model, &foreign_keys));
            if fail_fast && !found.is_empty() {
                return Ok(found);
            }
        }

        tracing::debug!(table, "Checking indexes");
        let indexes = self.catalog.list_indexes(table).await?;
        found.extend(check_indexes(table, model, &indexes, self.options.dialect));

        Ok(found)
    }
}

/// Validate every table of `catalog` against `registry`
pub async fn validate_schemas(
    catalog: &dyn CatalogAdapter,
    registry: &ModelRegistry,
    options: ValidationOptions,
) -> Result<ValidationRun, ValidationError> {
    SchemaValidator::new(catalog, registry, options).validate().await
}
