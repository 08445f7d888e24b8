//! Database dialect families and their introspection capabilities

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A family of database engines sharing DDL type syntax and catalog behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL and wire-compatible engines
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,

    /// MySQL and MariaDB
    #[serde(alias = "mariadb")]
    MySql,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    /// All known dialects
    pub const ALL: [Dialect; 2] = [Dialect::Postgres, Dialect::MySql];

    /// Stable lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }

    /// Whether foreign-key constraints can be read back from the catalog.
    ///
    /// MySQL is reported as unsupported: its generic key-usage view does not
    /// yield usable source/target pairs, so foreign keys there are only seen
    /// through the index they auto-create.
    pub fn supports_foreign_key_introspection(&self) -> bool {
        matches!(self, Self::Postgres)
    }

    /// Whether declaring a foreign key implicitly creates an index on the source column
    pub fn auto_creates_foreign_key_indexes(&self) -> bool {
        matches!(self, Self::MySql)
    }

    /// Whether integer and numeric types carry an `UNSIGNED` modifier
    pub fn supports_unsigned(&self) -> bool {
        matches!(self, Self::MySql)
    }

    /// Quote an identifier the way this dialect's driver does
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Self::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
            Self::MySql => format!("`{}`", ident.replace('`', "``")),
        }
    }
}

/// Strip one level of driver quoting from an identifier
pub fn unquote_identifier(ident: &str) -> &str {
    let trimmed = ident.trim();
    for quote in ['"', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a dialect name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dialect '{0}'. Supported: postgres, mysql")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_are_asymmetric() {
        assert!(Dialect::Postgres.supports_foreign_key_introspection());
        assert!(!Dialect::Postgres.auto_creates_foreign_key_indexes());
        assert!(!Dialect::MySql.supports_foreign_key_introspection());
        assert!(Dialect::MySql.auto_creates_foreign_key_indexes());
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert!("sqlite".parse::<Dialect>().is_err());
    }

    #[test]
    fn quoting() {
        assert_eq!(Dialect::Postgres.quote_identifier("userId"), "\"userId\"");
        assert_eq!(Dialect::MySql.quote_identifier("userId"), "`userId`");
        assert_eq!(unquote_identifier("\"userId\""), "userId");
        assert_eq!(unquote_identifier("`userId`"), "userId");
        assert_eq!(unquote_identifier("userId"), "userId");
    }
}
