//! Dialect type mapper
//!
//! Renders an abstract [`ColumnType`] as the exact type token the dialect's
//! catalog reports for it, so checkers can compare strings verbatim.
//!
//! Every dialect has one pure mapping function, registered in
//! [`DIALECT_TYPE_MAPPERS`]. Adding a dialect means adding one row.

use modeldrift_core::{AttributeDefinition, ColumnType, Dialect, TextSize};

/// Maps a column type to its native token, `None` when unmapped
pub type TypeMapper = fn(&ColumnType) -> Option<String>;

/// Dialect to mapper lookup table
pub const DIALECT_TYPE_MAPPERS: [(Dialect, TypeMapper); 2] = [
    (Dialect::Postgres, map_postgres_type),
    (Dialect::MySql, map_mysql_type),
];

const DEFAULT_STRING_LENGTH: u32 = 255;

/// An attribute whose type has no native rendering in the dialect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: no {dialect} type for descriptor {descriptor}")]
pub struct UnmappedType {
    pub field: String,
    pub dialect: Dialect,
    pub descriptor: String,
}

/// Look up the mapping function of a dialect
pub fn type_mapper(dialect: Dialect) -> TypeMapper {
    DIALECT_TYPE_MAPPERS
        .iter()
        .find(|(d, _)| *d == dialect)
        .map(|(_, mapper)| *mapper)
        .unwrap_or(map_unsupported)
}

/// Render an attribute's type for a dialect
///
/// The `UNSIGNED` modifier is appended only on dialects that support it.
pub fn map_type(attr: &AttributeDefinition, dialect: Dialect) -> Result<String, UnmappedType> {
    let token = type_mapper(dialect)(&attr.column_type).ok_or_else(|| {
        let unmapped = UnmappedType {
            field: attr.field().to_string(),
            dialect,
            descriptor: attr.column_type.descriptor(),
        };
        tracing::warn!(
            field = %unmapped.field,
            dialect = %dialect,
            descriptor = %unmapped.descriptor,
            "Unmapped column type"
        );
        unmapped
    })?;

    if dialect.supports_unsigned() && attr.column_type.is_unsigned() {
        Ok(format!("{} UNSIGNED", token))
    } else {
        Ok(token)
    }
}

fn map_unsupported(_: &ColumnType) -> Option<String> {
    None
}

fn enum_token(values: &[String]) -> String {
    let literals: Vec<String> = values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect();
    format!("ENUM({})", literals.join(","))
}

/// PostgreSQL: `information_schema` data types, upper-cased
pub fn map_postgres_type(column_type: &ColumnType) -> Option<String> {
    let token = match column_type {
        ColumnType::String { length } => {
            format!("CHARACTER VARYING({})", length.unwrap_or(DEFAULT_STRING_LENGTH))
        }
        ColumnType::Char { length } => format!("CHAR({})", length.unwrap_or(DEFAULT_STRING_LENGTH)),
        ColumnType::Text { .. } => "TEXT".to_string(),
        ColumnType::Integer { .. } | ColumnType::MediumInt { .. } => "INTEGER".to_string(),
        ColumnType::BigInt { .. } => "BIGINT".to_string(),
        ColumnType::SmallInt { .. } | ColumnType::TinyInt { .. } => "SMALLINT".to_string(),
        ColumnType::Float { .. } => "FLOAT".to_string(),
        ColumnType::Decimal {
            precision: Some(precision),
            scale,
            ..
        } => format!("DECIMAL({},{})", precision, scale.unwrap_or(0)),
        ColumnType::Decimal { precision: None, .. } => "DECIMAL".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Date => "TIMESTAMP WITH TIME ZONE".to_string(),
        ColumnType::DateOnly => "DATE".to_string(),
        ColumnType::Uuid => "UUID".to_string(),
        ColumnType::Enum { values } => enum_token(values),
        ColumnType::Json => "JSON".to_string(),
        ColumnType::Other { .. } => return None,
    };
    Some(token)
}

/// MySQL: `COLUMN_TYPE` values, upper-cased, with display widths
///
/// Unsigned types only change the default width here; [`map_type`] adds
/// the modifier.
pub fn map_mysql_type(column_type: &ColumnType) -> Option<String> {
    fn int(name: &str, length: Option<u32>, unsigned: bool, signed_width: u32, unsigned_width: u32) -> String {
        let width = length.unwrap_or(if unsigned { unsigned_width } else { signed_width });
        format!("{}({})", name, width)
    }

    let token = match column_type {
        ColumnType::String { length } => format!("VARCHAR({})", length.unwrap_or(DEFAULT_STRING_LENGTH)),
        ColumnType::Char { length } => format!("CHAR({})", length.unwrap_or(DEFAULT_STRING_LENGTH)),
        ColumnType::Text { size } => match size {
            None => "TEXT",
            Some(TextSize::Tiny) => "TINYTEXT",
            Some(TextSize::Medium) => "MEDIUMTEXT",
            Some(TextSize::Long) => "LONGTEXT",
        }
        .to_string(),
        ColumnType::Integer { length, unsigned } => int("INT", *length, *unsigned, 11, 10),
        ColumnType::BigInt { length, unsigned } => int("BIGINT", *length, *unsigned, 20, 20),
        ColumnType::SmallInt { length, unsigned } => int("SMALLINT", *length, *unsigned, 6, 5),
        ColumnType::TinyInt { length, unsigned } => int("TINYINT", *length, *unsigned, 4, 3),
        ColumnType::MediumInt { length, unsigned } => int("MEDIUMINT", *length, *unsigned, 9, 8),
        ColumnType::Float { .. } => "FLOAT".to_string(),
        ColumnType::Decimal { precision, scale, .. } => {
            format!("DECIMAL({},{})", precision.unwrap_or(10), scale.unwrap_or(0))
        }
        ColumnType::Boolean => "TINYINT(1)".to_string(),
        ColumnType::Date => "DATETIME".to_string(),
        ColumnType::DateOnly => "DATE".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::Enum { values } => enum_token(values),
        ColumnType::Json => "JSON".to_string(),
        ColumnType::Other { .. } => return None,
    };

    Some(token)
}
