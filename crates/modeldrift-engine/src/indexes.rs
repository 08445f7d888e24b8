//! Index checker: every catalog index must be explained by the model
//!
//! An index is explained by a declared index with the exact same ordered
//! fields, by a unique constraint on its single field, or by the dialect
//! auto-creating it for a declared foreign key.

use modeldrift_core::{Dialect, Discrepancy, IndexDefinition, IntrospectedIndex, ModelDefinition};

/// Compare one table's indexes with its model
pub fn check_indexes(
    table: &str,
    model: &ModelDefinition,
    indexes: &[IntrospectedIndex],
    dialect: Dialect,
) -> Vec<Discrepancy> {
    let declared = model.effective_indexes();
    let mut discrepancies = Vec::new();

    for index in indexes {
        let found: Vec<Discrepancy> = if index.primary {
            check_primary(table, model, index)
        } else {
            check_secondary(table, model, &declared, index, dialect)
                .into_iter()
                .collect()
        };

        discrepancies.extend(found.into_iter().map(|d| match &index.name {
            Some(name) => d.with_detail(format!("index {}", name)),
            None => d,
        }));
    }

    discrepancies
}

fn check_primary(table: &str, model: &ModelDefinition, index: &IntrospectedIndex) -> Vec<Discrepancy> {
    index
        .fields
        .iter()
        .filter(|field| !model.is_primary_key(field))
        .map(|field| Discrepancy::primary_key_field_mismatch(table, field))
        .collect()
}

fn check_secondary(
    table: &str,
    model: &ModelDefinition,
    declared: &[IndexDefinition],
    index: &IntrospectedIndex,
    dialect: Dialect,
) -> Option<Discrepancy> {
    let fields = &index.fields;

    if let Some(decl) = declared.iter().find(|d| &d.fields == fields) {
        return (decl.unique != index.unique)
            .then(|| Discrepancy::uniqueness_mismatch(table, fields, decl.unique, index.unique));
    }

    if fields.len() > 1 {
        return Some(Discrepancy::missing_composite_index(table, fields));
    }

    let Some(attr) = fields.first().and_then(|field| model.attribute(field)) else {
        return Some(Discrepancy::unexplained_index(table, fields));
    };

    if attr.is_unique() {
        return (!index.unique).then(|| Discrepancy::missing_unique_index(table, fields));
    }

    if let Some(group) = attr.unique_group() {
        return index
            .unique
            .then(|| Discrepancy::unexpected_unique_index(table, fields, group));
    }

    if attr.references.is_some() && dialect.auto_creates_foreign_key_indexes() {
        tracing::trace!(table, field = %attr.field(), "Tolerating auto-created foreign-key index");
        return None;
    }

    Some(Discrepancy::unexplained_index(table, fields))
}
