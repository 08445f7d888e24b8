//! Configuration schema (modeldrift.toml) and validation options

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::dialect::Dialect;

/// Migration bookkeeping table, excluded unless configured otherwise
pub const DEFAULT_MIGRATIONS_TABLE: &str = "SequelizeMeta";

/// Default bound on tables reconciled at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// How discrepancies are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Abort at the first discrepancy
    FailFast,

    /// Check every table and report everything found
    FullReport,
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::FailFast
    }
}

/// Options for one validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Tables skipped entirely (exact names or `*` patterns)
    pub exclude: BTreeSet<String>,

    /// Selects the type-mapping table and introspection capabilities
    pub dialect: Dialect,

    pub mode: ValidationMode,

    /// Maximum tables reconciled concurrently (at least 1)
    pub max_concurrency: usize,

    /// Compare column comments
    pub check_comments: bool,

    /// Flag model attributes that have no catalog column
    pub check_missing_columns: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            exclude: default_exclude().into_iter().collect(),
            dialect: Dialect::default(),
            mode: ValidationMode::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            check_comments: false,
            check_missing_columns: false,
        }
    }
}

impl ValidationOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Replace the exclusion set
    pub fn with_exclude<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Add one table to the exclusion set
    pub fn excluding(mut self, table: impl Into<String>) -> Self {
        self.exclude.insert(table.into());
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_check_comments(mut self, enabled: bool) -> Self {
        self.check_comments = enabled;
        self
    }

    pub fn with_check_missing_columns(mut self, enabled: bool) -> Self {
        self.check_missing_columns = enabled;
        self
    }

    /// Check if a table is excluded from validation
    pub fn is_excluded(&self, table: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, table)
            } else {
                pattern == table
            }
        })
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (`host=... user=...` or `postgres://` / `mysql://` URL)
    #[serde(default)]
    pub url: Option<String>,

    /// Schema to introspect (PostgreSQL; defaults to `public`)
    #[serde(default)]
    pub schema: Option<String>,

    /// Use TLS for the connection
    #[serde(default)]
    pub tls: bool,
}

fn default_exclude() -> Vec<String> {
    vec![DEFAULT_MIGRATIONS_TABLE.to_string()]
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_models_path() -> PathBuf {
    PathBuf::from("models.json")
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Path to the model definition file (relative to the config file)
    #[serde(default = "default_models_path")]
    pub models: PathBuf,

    /// Tables to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub mode: ValidationMode,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default)]
    pub check_comments: bool,

    #[serde(default)]
    pub check_missing_columns: bool,

    /// Connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            models: default_models_path(),
            exclude: default_exclude(),
            mode: ValidationMode::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            check_comments: false,
            check_missing_columns: false,
            database: DatabaseConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Model file path resolved against the project root
    pub fn models_path(&self) -> PathBuf {
        if self.models.is_absolute() {
            self.models.clone()
        } else {
            self.project_root.join(&self.models)
        }
    }

    /// Options for the validation engine
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            exclude: self.exclude.iter().cloned().collect(),
            dialect: self.dialect,
            mode: self.mode,
            max_concurrency: self.max_concurrency.max(1),
            check_comments: self.check_comments,
            check_missing_columns: self.check_missing_columns,
        }
    }
}

/// Simple glob matching (supports a single * wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len() && text.starts_with(prefix) && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_exclude_migrations_table() {
        let options = ValidationOptions::default();
        assert!(options.is_excluded(DEFAULT_MIGRATIONS_TABLE));
        assert!(!options.is_excluded("users"));
        assert_eq!(options.mode, ValidationMode::FailFast);
        assert_eq!(options.dialect, Dialect::Postgres);
    }

    #[test]
    fn empty_exclude_checks_everything() {
        let options = ValidationOptions::default().with_exclude(Vec::<String>::new());
        assert!(!options.is_excluded(DEFAULT_MIGRATIONS_TABLE));
    }

    #[test]
    fn exclude_patterns() {
        let options = ValidationOptions::default().excluding("tmp_*");
        assert!(options.is_excluded("tmp_import"));
        assert!(options.is_excluded("SequelizeMeta"));
        assert!(!options.is_excluded("imports"));
    }

    #[test]
    fn max_concurrency_is_clamped() {
        assert_eq!(ValidationOptions::default().with_max_concurrency(0).max_concurrency, 1);
    }

    #[test]
    fn config_from_toml() {
        let config = Config::from_toml(
            r#"
            dialect = "mysql"
            models = "schema/models.toml"
            exclude = ["SequelizeMeta", "audit_log"]
            mode = "full-report"
            max_concurrency = 2
            check_comments = true

            [database]
            url = "mysql://app@localhost/app"
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::MySql);
        assert_eq!(config.mode, ValidationMode::FullReport);
        assert_eq!(config.database.url.as_deref(), Some("mysql://app@localhost/app"));

        let options = config.validation_options();
        assert!(options.is_excluded("audit_log"));
        assert_eq!(options.max_concurrency, 2);
        assert!(options.check_comments);
        assert!(!options.check_missing_columns);
    }

    #[test]
    fn config_defaults_when_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.exclude, vec![DEFAULT_MIGRATIONS_TABLE.to_string()]);
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.models, PathBuf::from("models.json"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        assert!(matches!(
            Config::from_toml("max_concurrency = 0"),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.dialect, parsed.dialect);
        assert_eq!(config.exclude, parsed.exclude);
    }

    #[test]
    fn glob_matching() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("staging_*", "staging_users"));
        assert!(glob_match("*_old", "users_old"));
        assert!(!glob_match("staging_*", "prod_users"));
    }
}
