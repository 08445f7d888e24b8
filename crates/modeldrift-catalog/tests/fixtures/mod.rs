//! Test fixtures for catalog adapter integration tests
//!
//! These fixtures describe common table shapes as a catalog would report
//! them, in canonical PostgreSQL form.

#![allow(dead_code)]

use modeldrift_catalog::MockTable;
use modeldrift_core::{IntrospectedColumn, IntrospectedForeignKey, IntrospectedIndex};

/// A typical users table
///
/// - Primary key (id)
/// - Unique email
/// - Nullable display name
pub fn users_table() -> MockTable {
    MockTable::new(vec![
        IntrospectedColumn::new("id", "INTEGER").with_primary_key(),
        IntrospectedColumn::new("email", "CHARACTER VARYING(255)").with_nullable(false),
        IntrospectedColumn::new("name", "CHARACTER VARYING(255)"),
        IntrospectedColumn::new("created_at", "TIMESTAMP WITH TIME ZONE").with_nullable(false),
    ])
    .with_index(IntrospectedIndex::unique(["email"]).with_name("users_email_key"))
}

/// A typical orders table
///
/// - Primary key (id)
/// - Foreign key (user_id -> users.id)
/// - Composite lookup index (user_id, status)
pub fn orders_table() -> MockTable {
    MockTable::new(vec![
        IntrospectedColumn::new("id", "INTEGER").with_primary_key(),
        IntrospectedColumn::new("user_id", "INTEGER").with_nullable(false),
        IntrospectedColumn::new("total_amount", "DECIMAL(10,2)").with_nullable(false),
        IntrospectedColumn::new("status", "ENUM('pending','paid','shipped')").with_nullable(false),
    ])
    .with_foreign_key(IntrospectedForeignKey::new("\"user_id\"", "users", "id"))
    .with_index(IntrospectedIndex::new(["user_id", "status"]).with_name("orders_user_status"))
}

/// The migrations bookkeeping table
pub fn migrations_table() -> MockTable {
    MockTable::new(vec![
        IntrospectedColumn::new("name", "CHARACTER VARYING(255)").with_primary_key(),
    ])
}
