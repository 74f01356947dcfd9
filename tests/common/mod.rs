#![allow(dead_code)]

use filtercrate::{ParseOptions, parse_query};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde_json::Value;

pub mod customer_entity;

/// Route library events to the test writer; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse `query` and return the serialized `{ where, orderBy, skip, take }` object.
pub fn parse_json(query: &str, options: &ParseOptions) -> Value {
    serde_json::to_value(parse_query(query, options)).expect("parsed query serializes")
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    db.execute_unprepared(
        "CREATE TABLE customers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            tier TEXT NOT NULL,
            age INTEGER NOT NULL,
            active BOOLEAN NOT NULL
        )",
    )
    .await?;

    db.execute_unprepared(
        "INSERT INTO customers (id, name, email, tier, age, active) VALUES
            (1, 'Ann Lee', 'ann@example.com', 'gold', 34, 1),
            (2, 'Bob Stone', 'bob@corp.io', 'silver', 27, 1),
            (3, 'Joanna Park', 'jo@example.com', 'bronze', 45, 0),
            (4, 'Dan 100% Real', 'dan@corp.io', 'gold', 19, 1),
            (5, 'Eve_Adams', 'eve@example.org', 'silver', 61, 0)",
    )
    .await?;

    Ok(db)
}
