//! Foreign-key checker: declared references vs introspected constraints
//!
//! Only run for dialects whose catalog exposes foreign keys. Elsewhere the
//! index checker's auto-created-index rule stands in for it.

use modeldrift_core::{Discrepancy, IntrospectedForeignKey, ModelDefinition};

/// Compare one table's foreign keys with its model's references
///
/// Declared references are checked first, in attribute order, then catalog
/// keys the model does not declare, in catalog order.
pub fn check_foreign_keys(
    table: &str,
    model: &ModelDefinition,
    foreign_keys: &[IntrospectedForeignKey],
) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();

    for attr in &model.attributes {
        let Some(reference) = &attr.references else {
            continue;
        };
        let expected = format!("{}.{}", reference.table, reference.key);

        match foreign_keys.iter().find(|fk| fk.source_column() == attr.field()) {
            None => {
                discrepancies.push(Discrepancy::declared_foreign_key_missing(table, attr.field(), &expected));
            }
            // Only the target column has to agree
            Some(fk) if fk.to != reference.key => {
                discrepancies.push(
                    Discrepancy::foreign_key_target_mismatch(
                        table,
                        attr.field(),
                        &expected,
                        &format!("{}.{}", fk.to_table, fk.to),
                    )
                    .with_detail(format!("{:?}", fk)),
                );
            }
            Some(_) => {}
        }
    }

    for fk in foreign_keys {
        let source = fk.source_column();
        // Columns unknown to the model were already reported as undefined attributes
        let Some(attr) = model.attribute(source) else {
            continue;
        };
        if attr.references.is_none() {
            discrepancies.push(
                Discrepancy::undeclared_foreign_key(table, source, &format!("{}.{}", fk.to_table, fk.to))
                    .with_detail(format!("{:?}", fk)),
            );
        }
    }

    discrepancies
}
