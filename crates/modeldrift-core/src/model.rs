//! Declared data model: column types, attributes, indexes and the model registry
//!
//! Models are loaded once (usually from `models.json` or `models.toml`) and
//! are read-only for the rest of a validation run.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Size class of an unbounded text column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Tiny,
    Medium,
    Long,
}

/// Abstract column type, decided when the model is loaded
///
/// Unknown descriptors are kept as [`ColumnType::Other`] so that a single
/// odd attribute never prevents a model file from loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnType {
    /// Bounded character string
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },

    /// Fixed-length character string
    Char {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },

    /// Unbounded text, optionally size-classed
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<TextSize>,
    },

    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    #[serde(alias = "bigint")]
    BigInt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    #[serde(alias = "smallint")]
    SmallInt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    #[serde(alias = "tinyint")]
    TinyInt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    #[serde(alias = "mediumint")]
    MediumInt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    Float {
        #[serde(default)]
        unsigned: bool,
    },

    /// Fixed-point number
    Decimal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<u32>,
        #[serde(default)]
        unsigned: bool,
    },

    Boolean,

    /// Timestamp with time zone
    Date,

    /// Calendar date without time
    #[serde(alias = "dateonly")]
    DateOnly,

    Uuid,

    /// Enumerated literal list, in declaration order
    Enum { values: Vec<String> },

    Json,

    /// Descriptor that no dialect knows how to render
    Other { descriptor: String },
}

impl ColumnType {
    /// Build a column type from a raw descriptor.
    ///
    /// Accepts the tagged form (`{"kind": "string", "length": 100}`) or the
    /// bare shorthand (`"integer"`). Anything else becomes `Other`.
    pub fn from_descriptor(raw: serde_json::Value) -> Self {
        let tagged = match &raw {
            serde_json::Value::String(kind) => {
                serde_json::json!({ "kind": kind.trim().to_lowercase() })
            }
            serde_json::Value::Object(fields) => {
                let mut fields = fields.clone();
                if let Some(serde_json::Value::String(kind)) = fields.get_mut("kind") {
                    *kind = kind.trim().to_lowercase();
                }
                serde_json::Value::Object(fields)
            }
            _ => raw.clone(),
        };

        serde_json::from_value(tagged).unwrap_or_else(|_| {
            let descriptor = match raw {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            ColumnType::Other { descriptor }
        })
    }

    /// Raw descriptor text, used in diagnostics
    pub fn descriptor(&self) -> String {
        match self {
            Self::Other { descriptor } => descriptor.clone(),
            known => serde_json::to_string(known).unwrap_or_else(|_| format!("{:?}", known)),
        }
    }

    /// Whether the `unsigned` modifier is set
    pub fn is_unsigned(&self) -> bool {
        match self {
            Self::Integer { unsigned, .. }
            | Self::BigInt { unsigned, .. }
            | Self::SmallInt { unsigned, .. }
            | Self::TinyInt { unsigned, .. }
            | Self::MediumInt { unsigned, .. }
            | Self::Float { unsigned }
            | Self::Decimal { unsigned, .. } => *unsigned,
            _ => false,
        }
    }
}

fn deserialize_column_type<'de, D>(deserializer: D) -> Result<ColumnType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(ColumnType::from_descriptor(raw))
}

/// Uniqueness constraint on a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Uniqueness {
    /// `true` means the column is unique on its own
    Flag(bool),

    /// Column is unique together with the other members of this group
    Group(String),
}

/// Target of a declared foreign key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Referenced table
    pub table: String,

    /// Referenced column
    pub key: String,
}

/// A declared attribute of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name in the model
    pub name: String,

    /// Column name, when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(rename = "type", deserialize_with = "deserialize_column_type")]
    pub column_type: ColumnType,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub auto_increment: bool,

    /// Unset means nullable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_null: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<Uniqueness>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
}

impl AttributeDefinition {
    /// Create a nullable, non-key attribute
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            field: None,
            column_type,
            primary_key: false,
            auto_increment: false,
            allow_null: None,
            unique: None,
            comment: None,
            references: None,
        }
    }

    /// Column name in the table
    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    /// Nullable unless `allow_null` is explicitly false
    pub fn is_nullable(&self) -> bool {
        self.allow_null != Some(false)
    }

    /// Unique on its own (not as part of a group)
    pub fn is_unique(&self) -> bool {
        matches!(self.unique, Some(Uniqueness::Flag(true)))
    }

    /// Name of the composite unique group this attribute belongs to
    pub fn unique_group(&self) -> Option<&str> {
        match &self.unique {
            Some(Uniqueness::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Mark as primary key
    ///
    /// Nullability is left alone, as when loading a model file: a key
    /// column is still nullable unless `allow_null` is set to false.
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = Some(allow_null);
        self
    }

    pub fn with_unique(mut self) -> Self {
        self.unique = Some(Uniqueness::Flag(true));
        self
    }

    pub fn with_unique_group(mut self, group: impl Into<String>) -> Self {
        self.unique = Some(Uniqueness::Group(group.into()));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_reference(mut self, table: impl Into<String>, key: impl Into<String>) -> Self {
        self.references = Some(Reference {
            table: table.into(),
            key: key.into(),
        });
        self
    }
}

/// A declared index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Column names, order matters
    pub fields: Vec<String>,

    #[serde(default)]
    pub unique: bool,
}

impl IndexDefinition {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
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

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Declared shape of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub table_name: String,

    /// Attributes in declaration order
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,

    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
}

impl ModelDefinition {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            attributes: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Find an attribute by column name
    pub fn attribute(&self, field: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.field() == field)
    }

    /// Column names of primary-key attributes
    pub fn primary_keys(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.primary_key)
            .map(|a| a.field())
            .collect()
    }

    pub fn is_primary_key(&self, field: &str) -> bool {
        self.attribute(field).map_or(false, |a| a.primary_key)
    }

    /// Named unique groups and their member columns, in declaration order
    pub fn unique_groups(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for attribute in &self.attributes {
            if let Some(group) = attribute.unique_group() {
                groups.entry(group).or_default().push(attribute.field());
            }
        }
        groups
    }

    /// Declared indexes plus the implicit unique index of every unique group
    pub fn effective_indexes(&self) -> Vec<IndexDefinition> {
        let mut indexes = self.indexes.clone();
        for (group, fields) in self.unique_groups() {
            if indexes.iter().any(|i| i.fields.iter().map(String::as_str).eq(fields.iter().copied())) {
                continue;
            }
            indexes.push(IndexDefinition::unique(fields).with_name(group));
        }
        indexes
    }

    /// Check internal consistency: field names must be unique
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.field()) {
                return Err(ModelError::DuplicateField {
                    table: self.table_name.clone(),
                    field: attribute.field().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Registry of model definitions keyed by table name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDefinition>,
}

#[derive(Deserialize)]
struct ModelFile {
    #[serde(default)]
    models: Vec<ModelDefinition>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate tables and duplicate fields
    pub fn from_models(models: impl IntoIterator<Item = ModelDefinition>) -> Result<Self, ModelError> {
        let mut registry = Self::new();
        for model in models {
            registry.register(model)?;
        }
        Ok(registry)
    }

    /// Add a model
    pub fn register(&mut self, model: ModelDefinition) -> Result<(), ModelError> {
        model.validate()?;
        if self.models.contains_key(&model.table_name) {
            return Err(ModelError::DuplicateTable(model.table_name));
        }
        self.models.insert(model.table_name.clone(), model);
        Ok(())
    }

    /// Load from a JSON document `{ "models": [...] }`
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(json)
            .map_err(|e| ModelError::ParseError(e.to_string()))?;
        Self::from_models(file.models)
    }

    /// Load from a TOML document with `[[models]]` tables
    pub fn from_toml(toml: &str) -> Result<Self, ModelError> {
        let file: ModelFile = toml::from_str(toml)
            .map_err(|e| ModelError::ParseError(e.to_string()))?;
        Self::from_models(file.models)
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModelError::IoError(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            Some("toml") => Self::from_toml(&contents),
            _ => Err(ModelError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Resolve the model for a table
    pub fn resolve_model(&self, table: &str) -> Option<&ModelDefinition> {
        self.models.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Errors raised while loading model definitions
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported model file format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Model for table '{0}' is defined more than once")]
    DuplicateTable(String),

    #[error("Field '{field}' is defined more than once in model '{table}'")]
    DuplicateField { table: String, field: String },
}
