//! Test fixtures for reconciliation tests
//!
//! A small shop schema declared once as models and rendered per dialect as
//! the catalog would report it after all migrations ran.

#![allow(dead_code)]

use modeldrift_catalog::{MockCatalog, MockTable};
use modeldrift_core::{
    AttributeDefinition, ColumnType, Dialect, IndexDefinition, IntrospectedColumn, IntrospectedForeignKey,
    IntrospectedIndex, ModelDefinition, ModelRegistry,
};

fn int() -> ColumnType {
    ColumnType::Integer { length: None, unsigned: false }
}

/// users: id, unique email, optional name, created_at
pub fn users_model() -> ModelDefinition {
    ModelDefinition::new("users")
        .with_attribute(AttributeDefinition::new("id", int()).with_primary_key().with_allow_null(false).with_auto_increment())
        .with_attribute(
            AttributeDefinition::new("email", ColumnType::String { length: Some(120) })
                .with_allow_null(false)
                .with_unique(),
        )
        .with_attribute(AttributeDefinition::new("name", ColumnType::String { length: None }))
        .with_attribute(AttributeDefinition::new("created_at", ColumnType::Date).with_allow_null(false))
}

/// orders: belongs to a user, optional coupon without a declared relation
pub fn orders_model() -> ModelDefinition {
    ModelDefinition::new("orders")
        .with_attribute(AttributeDefinition::new("id", int()).with_primary_key().with_allow_null(false).with_auto_increment())
        .with_attribute(
            AttributeDefinition::new("user_id", int())
                .with_allow_null(false)
                .with_reference("users", "id"),
        )
        .with_attribute(AttributeDefinition::new("coupon_id", int()))
        .with_attribute(
            AttributeDefinition::new(
                "total",
                ColumnType::Decimal { precision: Some(10), scale: Some(2), unsigned: false },
            )
            .with_allow_null(false),
        )
        .with_attribute(
            AttributeDefinition::new(
                "status",
                ColumnType::Enum { values: vec!["pending".into(), "paid".into()] },
            )
            .with_allow_null(false),
        )
        .with_index(IndexDefinition::new(["status", "user_id"]))
}

/// memberships: (user_id, team_id) unique together
pub fn memberships_model() -> ModelDefinition {
    ModelDefinition::new("memberships")
        .with_attribute(AttributeDefinition::new("id", int()).with_primary_key().with_allow_null(false))
        .with_attribute(
            AttributeDefinition::new("user_id", int())
                .with_allow_null(false)
                .with_unique_group("member")
                .with_reference("users", "id"),
        )
        .with_attribute(
            AttributeDefinition::new("team_id", int())
                .with_allow_null(false)
                .with_unique_group("member"),
        )
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::from_models(vec![users_model(), orders_model(), memberships_model()])
        .expect("fixture models are consistent")
}

struct Types {
    int: &'static str,
    email: &'static str,
    name: &'static str,
    timestamp: &'static str,
}

fn types(dialect: Dialect) -> Types {
    match dialect {
        Dialect::Postgres => Types {
            int: "INTEGER",
            email: "CHARACTER VARYING(120)",
            name: "CHARACTER VARYING(255)",
            timestamp: "TIMESTAMP WITH TIME ZONE",
        },
        Dialect::MySql => Types {
            int: "INT(11)",
            email: "VARCHAR(120)",
            name: "VARCHAR(255)",
            timestamp: "DATETIME",
        },
    }
}

pub fn users_table(dialect: Dialect) -> MockTable {
    let t = types(dialect);
    MockTable::new(vec![
        IntrospectedColumn::new("id", t.int).with_primary_key(),
        IntrospectedColumn::new("email", t.email).with_nullable(false),
        IntrospectedColumn::new("name", t.name),
        IntrospectedColumn::new("created_at", t.timestamp).with_nullable(false),
    ])
    .with_index(IntrospectedIndex::unique(["email"]).with_name("users_email_key"))
}

pub fn orders_table(dialect: Dialect) -> MockTable {
    let t = types(dialect);
    let table = MockTable::new(vec![
        IntrospectedColumn::new("id", t.int).with_primary_key(),
        IntrospectedColumn::new("user_id", t.int).with_nullable(false),
        IntrospectedColumn::new("coupon_id", t.int),
        IntrospectedColumn::new("total", "DECIMAL(10,2)").with_nullable(false),
        IntrospectedColumn::new("status", "ENUM('pending','paid')").with_nullable(false),
    ])
    .with_index(IntrospectedIndex::new(["status", "user_id"]).with_name("orders_status_user_id"));

    match dialect {
        Dialect::Postgres => table.with_foreign_key(IntrospectedForeignKey::new(dialect.quote_identifier("user_id"), "users", "id")),
        // MySQL indexes the referencing column on its own
        Dialect::MySql => table.with_index(IntrospectedIndex::new(["user_id"]).with_name("user_id")),
    }
}

pub fn memberships_table(dialect: Dialect) -> MockTable {
    let t = types(dialect);
    let table = MockTable::new(vec![
        IntrospectedColumn::new("id", t.int).with_primary_key(),
        IntrospectedColumn::new("user_id", t.int).with_nullable(false),
        IntrospectedColumn::new("team_id", t.int).with_nullable(false),
    ])
    .with_index(IntrospectedIndex::unique(["user_id", "team_id"]).with_name("member"));

    match dialect {
        Dialect::Postgres => table.with_foreign_key(IntrospectedForeignKey::new(dialect.quote_identifier("user_id"), "users", "id")),
        Dialect::MySql => table,
    }
}

pub fn migrations_table() -> MockTable {
    MockTable::new(vec![IntrospectedColumn::new("name", "CHARACTER VARYING(255)").with_primary_key()])
}

/// Catalog in sync with [`registry`], plus the migrations table
pub fn catalog(dialect: Dialect) -> MockCatalog {
    MockCatalog::new(dialect)
        .with_table("users", users_table(dialect))
        .with_table("orders", orders_table(dialect))
        .with_table("memberships", memberships_table(dialect))
        .with_table("SequelizeMeta", migrations_table())
}

/// `count` identical single-column tables, with a registry modelling all of them
pub fn tag_tables(count: usize, latency_ms: u64) -> (ModelRegistry, MockCatalog) {
    let names: Vec<String> = (0..count).map(|i| format!("tags_{:02}", i)).collect();

    let models: Vec<ModelDefinition> = names
        .iter()
        .map(|name| {
            ModelDefinition::new(name.as_str())
                .with_attribute(AttributeDefinition::new("id", int()).with_primary_key().with_allow_null(false))
        })
        .collect();
    let registry = ModelRegistry::from_models(models).expect("fixture models are consistent");

    let catalog = names.iter().fold(MockCatalog::new(Dialect::Postgres).with_latency(latency_ms), |catalog, name| {
        catalog.with_table(name.as_str(), MockTable::new(vec![IntrospectedColumn::new("id", "INTEGER").with_primary_key()]))
    });

    (registry, catalog)
}
