//! modeldrift engine - schema reconciliation
//!
//! This crate implements the reconciliation logic:
//! - Dialect type mapping
//! - Attribute, foreign-key and index checks
//! - The orchestrator that runs them over every table

pub mod attributes;
pub mod foreign_keys;
pub mod indexes;
pub mod type_mapper;
pub mod validator;

pub use attributes::check_attributes;
pub use foreign_keys::check_foreign_keys;
pub use indexes::check_indexes;
pub use type_mapper::{map_type, type_mapper, TypeMapper, UnmappedType, DIALECT_TYPE_MAPPERS};
pub use validator::{validate_schemas, SchemaValidator, ValidationError, ValidationRun};
