//! Discrepancy kinds and structured mismatch records
//!
//! IMPORTANT: Discrepancy codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Discrepancy kind registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyKind {
    // Table level
    /// A catalog table has no model definition
    UndefinedModel,

    // Attributes
    /// A catalog column has no model attribute
    UndefinedAttribute,

    /// Mapped model type differs from the catalog type
    TypeMismatch,

    /// Primary-key flag differs
    PrimaryKeyMismatch,

    /// Nullability differs
    NullabilityMismatch,

    /// Column comment differs
    CommentMismatch,

    /// A model attribute has no catalog column (opt-in)
    MissingColumn,

    // Foreign keys
    /// Declared reference and catalog foreign key disagree on existence
    MissingForeignKey,

    /// Foreign key points at a different column than declared
    ForeignKeyTargetMismatch,

    // Indexes
    /// Primary index covers a column that is not a declared primary key
    PrimaryKeyFieldMismatch,

    /// Multi-column catalog index has no declared counterpart
    MissingCompositeIndex,

    /// Declared and catalog index disagree on uniqueness
    UniquenessMismatch,

    /// Attribute is declared unique but its index is not
    MissingUniqueIndex,

    /// Attribute is unique only within a group but its own index is unique
    UnexpectedUniqueIndex,

    /// Catalog index explained by nothing in the model
    UnexplainedIndex,
}

impl DiscrepancyKind {
    /// Get the kind as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UndefinedModel => "UNDEFINED_MODEL",
            Self::UndefinedAttribute => "UNDEFINED_ATTRIBUTE",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::PrimaryKeyMismatch => "PRIMARY_KEY_MISMATCH",
            Self::NullabilityMismatch => "NULLABILITY_MISMATCH",
            Self::CommentMismatch => "COMMENT_MISMATCH",
            Self::MissingColumn => "MISSING_COLUMN",
            Self::MissingForeignKey => "MISSING_FOREIGN_KEY",
            Self::ForeignKeyTargetMismatch => "FOREIGN_KEY_TARGET_MISMATCH",
            Self::PrimaryKeyFieldMismatch => "PRIMARY_KEY_FIELD_MISMATCH",
            Self::MissingCompositeIndex => "MISSING_COMPOSITE_INDEX",
            Self::UniquenessMismatch => "UNIQUENESS_MISMATCH",
            Self::MissingUniqueIndex => "MISSING_UNIQUE_INDEX",
            Self::UnexpectedUniqueIndex => "UNEXPECTED_UNIQUE_INDEX",
            Self::UnexplainedIndex => "UNEXPLAINED_INDEX",
        }
    }
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single mismatch between the declared model and the live catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Stable kind
    pub kind: DiscrepancyKind,

    /// Table the mismatch was found in
    pub table: String,

    /// Column(s) involved, in catalog order
    pub fields: Vec<String>,

    /// Human-readable message
    pub message: String,

    /// Expected value (model side)
    pub expected: Option<String>,

    /// Actual value (catalog side)
    pub actual: Option<String>,

    /// Extra context, such as the raw index or foreign-key record
    pub detail: Option<String>,
}

impl Discrepancy {
    /// Create a new discrepancy with minimal fields
    pub fn new(kind: DiscrepancyKind, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            fields: Vec::new(),
            message: message.into(),
            expected: None,
            actual: None,
            detail: None,
        }
    }

    /// Set the involved fields
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Set free-text detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn undefined_model(table: &str) -> Self {
        Self::new(
            DiscrepancyKind::UndefinedModel,
            table,
            format!("{} has not been defined", table),
        )
    }

    pub fn undefined_attribute(table: &str, field: &str) -> Self {
        Self::new(
            DiscrepancyKind::UndefinedAttribute,
            table,
            format!("{}.{} is not defined", table, field),
        )
        .with_fields([field])
    }

    pub fn type_mismatch(table: &str, field: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            DiscrepancyKind::TypeMismatch,
            table,
            format!(
                "{table}.{field} field type is invalid. Model.{field}.type[{expected}] != Table.{field}.type[{actual}]"
            ),
        )
        .with_fields([field])
        .with_comparison(expected, actual)
    }

    pub fn primary_key_mismatch(table: &str, field: &str, expected: bool, actual: bool) -> Self {
        Self::new(
            DiscrepancyKind::PrimaryKeyMismatch,
            table,
            format!(
                "illegal primaryKey defined {table}.{field}. Model.primaryKey[{expected}] != Table.primaryKey[{actual}]"
            ),
        )
        .with_fields([field])
        .with_comparison(expected.to_string(), actual.to_string())
    }

    pub fn nullability_mismatch(table: &str, field: &str, expected: bool, actual: bool) -> Self {
        Self::new(
            DiscrepancyKind::NullabilityMismatch,
            table,
            format!(
                "illegal allowNull defined {table}.{field}. Model.allowNull[{expected}] != Table.allowNull[{actual}]"
            ),
        )
        .with_fields([field])
        .with_comparison(expected.to_string(), actual.to_string())
    }

    pub fn comment_mismatch(table: &str, field: &str, expected: Option<&str>, actual: Option<&str>) -> Self {
        let expected = expected.unwrap_or("");
        let actual = actual.unwrap_or("");
        Self::new(
            DiscrepancyKind::CommentMismatch,
            table,
            format!(
                "illegal comment defined {table}.{field}. Model.comment[{expected}] != Table.comment[{actual}]"
            ),
        )
        .with_fields([field])
        .with_comparison(expected, actual)
    }

    pub fn missing_column(table: &str, field: &str, expected_type: &str) -> Self {
        Self::new(
            DiscrepancyKind::MissingColumn,
            table,
            format!("{table}.{field} is defined in the model but missing from the table (expected type: {expected_type})"),
        )
        .with_fields([field])
        .with_comparison(expected_type, "<absent>")
    }

    /// Model declares a reference that the catalog has no foreign key for
    pub fn declared_foreign_key_missing(table: &str, field: &str, target: &str) -> Self {
        Self::new(
            DiscrepancyKind::MissingForeignKey,
            table,
            format!("{table}.{field} defined foreign key to {target} but the table has none"),
        )
        .with_fields([field])
        .with_comparison(target, "<absent>")
    }

    /// Catalog has a foreign key the model does not declare
    pub fn undeclared_foreign_key(table: &str, field: &str, target: &str) -> Self {
        Self::new(
            DiscrepancyKind::MissingForeignKey,
            table,
            format!("{table}.[{field}] must be defined foreign key (table references {target})"),
        )
        .with_fields([field])
        .with_comparison("<absent>", target)
    }

    pub fn foreign_key_target_mismatch(table: &str, field: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            DiscrepancyKind::ForeignKeyTargetMismatch,
            table,
            format!("{table}.{field} => {expected} must be same to foreignKey [{actual}]"),
        )
        .with_fields([field])
        .with_comparison(expected, actual)
    }

    pub fn primary_key_field_mismatch(table: &str, field: &str) -> Self {
        Self::new(
            DiscrepancyKind::PrimaryKeyFieldMismatch,
            table,
            format!("{}.{} must be primaryKey", table, field),
        )
        .with_fields([field])
        .with_comparison("primary key", "not a primary key in the model")
    }

    pub fn missing_composite_index(table: &str, fields: &[String]) -> Self {
        let joined = fields.join(",");
        Self::new(
            DiscrepancyKind::MissingCompositeIndex,
            table,
            format!("{table}.[{joined}] must be defined combination key"),
        )
        .with_fields(fields.iter().cloned())
        .with_comparison("<absent>", format!("[{joined}]"))
    }

    pub fn uniqueness_mismatch(table: &str, fields: &[String], expected: bool, actual: bool) -> Self {
        let joined = fields.join(",");
        Self::new(
            DiscrepancyKind::UniquenessMismatch,
            table,
            format!("{table}.[{joined}] must be same unique value. Model.unique[{expected}] != Table.unique[{actual}]"),
        )
        .with_fields(fields.iter().cloned())
        .with_comparison(expected.to_string(), actual.to_string())
    }

    pub fn missing_unique_index(table: &str, fields: &[String]) -> Self {
        let joined = fields.join(",");
        Self::new(
            DiscrepancyKind::MissingUniqueIndex,
            table,
            format!("{table}.[{joined}] must be defined unique key"),
        )
        .with_fields(fields.iter().cloned())
        .with_comparison("unique", "not unique")
    }

    pub fn unexpected_unique_index(table: &str, fields: &[String], group: &str) -> Self {
        let joined = fields.join(",");
        Self::new(
            DiscrepancyKind::UnexpectedUniqueIndex,
            table,
            format!("{table}.[{joined}] must not be unique on its own, it is unique only within group '{group}'"),
        )
        .with_fields(fields.iter().cloned())
        .with_comparison("not unique", "unique")
    }

    pub fn unexplained_index(table: &str, fields: &[String]) -> Self {
        let joined = fields.join(",");
        Self::new(
            DiscrepancyKind::UnexplainedIndex,
            table,
            format!("{table}.[{joined}] is not defined index"),
        )
        .with_fields(fields.iter().cloned())
        .with_comparison("<absent>", format!("[{joined}]"))
    }
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            if !(self.message.contains(expected.as_str()) && self.message.contains(actual.as_str())) {
                write!(f, " (expected: {}, actual: {})", expected, actual)?;
            }
        }
        if let Some(detail) = &self.detail {
            write!(f, "\n{}", detail)?;
        }
        Ok(())
    }
}
