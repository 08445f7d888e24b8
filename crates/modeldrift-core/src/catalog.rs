//! Records produced by catalog introspection
//!
//! These are fresh snapshots of the live schema and are never cached
//! between validation runs.

use serde::{Deserialize, Serialize};

/// A column as reported by the database catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectedColumn {
    /// Column name
    pub field: String,

    /// Native type in canonical upper-case form (e.g. `CHARACTER VARYING(255)`)
    pub column_type: String,

    pub nullable: bool,

    pub primary_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl IntrospectedColumn {
    /// Create a nullable, non-key column
    pub fn new(field: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            column_type: column_type.into(),
            nullable: true,
            primary_key: false,
            default_value: None,
            comment: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Columns of one table, in ordinal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub columns: Vec<IntrospectedColumn>,
}

impl TableDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<IntrospectedColumn>) -> Self {
        Self { columns }
    }

    /// Find a column by name
    pub fn column(&self, field: &str) -> Option<&IntrospectedColumn> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }
}

/// A foreign-key constraint as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectedForeignKey {
    /// Source column, possibly quoted by the driver
    pub from: String,

    /// Referenced table
    pub to_table: String,

    /// Referenced column
    pub to: String,
}

impl IntrospectedForeignKey {
    pub fn new(from: impl Into<String>, to_table: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to_table: to_table.into(),
            to: to.into(),
        }
    }

    /// Source column with driver quoting removed
    pub fn source_column(&self) -> &str {
        crate::dialect::unquote_identifier(&self.from)
    }
}

/// An index as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectedIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Covered columns in catalog order
    pub fields: Vec<String>,

    pub unique: bool,

    pub primary: bool,
}

impl IntrospectedIndex {
    /// Plain, non-unique index
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
            primary: false,
        }
    }

    pub fn unique<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            ..Self::new(fields)
        }
    }

    pub fn primary<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            primary: true,
            ..Self::new(fields)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
