//! Attribute checker: declared attributes vs introspected columns
//!
//! The comparison walks the catalog's columns. A model attribute with no
//! column is only reported when `check_missing_columns` is enabled.

use modeldrift_core::{Discrepancy, ModelDefinition, TableDescription, ValidationOptions};

use crate::type_mapper::map_type;

/// Compare one table's columns with its model
///
/// Discrepancies are returned in catalog column order; per column the order
/// is type, primary key, nullability, comment.
pub fn check_attributes(
    table: &str,
    model: &ModelDefinition,
    columns: &TableDescription,
    options: &ValidationOptions,
) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();

    for column in &columns.columns {
        let Some(attr) = model.attribute(&column.field) else {
            discrepancies.push(Discrepancy::undefined_attribute(table, &column.field));
            continue;
        };

        match map_type(attr, options.dialect) {
            Ok(expected) if expected == column.column_type => {}
            Ok(expected) => {
                discrepancies.push(Discrepancy::type_mismatch(
                    table,
                    &column.field,
                    &expected,
                    &column.column_type,
                ));
            }
            Err(unmapped) => {
                discrepancies.push(
                    Discrepancy::type_mismatch(
                        table,
                        &column.field,
                        &unmapped.descriptor,
                        &column.column_type,
                    )
                    .with_detail(unmapped.to_string()),
                );
            }
        }

        if attr.primary_key != column.primary_key {
            discrepancies.push(Discrepancy::primary_key_mismatch(
                table,
                &column.field,
                attr.primary_key,
                column.primary_key,
            ));
        }

        if attr.is_nullable() != column.nullable {
            discrepancies.push(Discrepancy::nullability_mismatch(
                table,
                &column.field,
                attr.is_nullable(),
                column.nullable,
            ));
        }

        if options.check_comments {
            let expected = normalize_comment(attr.comment.as_deref());
            let actual = normalize_comment(column.comment.as_deref());
            if expected != actual {
                discrepancies.push(Discrepancy::comment_mismatch(table, &column.field, expected, actual));
            }
        }
    }

    if options.check_missing_columns {
        for attr in &model.attributes {
            if columns.column(attr.field()).is_none() {
                let expected = map_type(attr, options.dialect).unwrap_or_else(|u| u.descriptor);
                discrepancies.push(Discrepancy::missing_column(table, attr.field(), &expected));
            }
        }
    }

    discrepancies
}

fn normalize_comment(comment: Option<&str>) -> Option<&str> {
    comment.map(str::trim).filter(|c| !c.is_empty())
}
