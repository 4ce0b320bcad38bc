#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, NewTransactionCmd, User};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    for (id, email, name) in [
        ("alice", "alice@example.com", "Alice Johnson"),
        ("bob", "bob@example.com", "Bob Smith"),
        ("charlie", "charlie@example.com", "Charlie Brown"),
        ("dana", "dana@example.com", "Dana Scully"),
    ] {
        engine
            .create_user(&User {
                id: id.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                avatar_url: None,
                google_id: None,
            })
            .await
            .unwrap();
    }

    (engine, db)
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub async fn expense(engine: &Engine, owner: &str, amount_minor: i64, date: DateTime<Utc>) -> Uuid {
    engine
        .new_transaction(NewTransactionCmd {
            user_id: owner.to_string(),
            amount_minor,
            description: format!("expense of {amount_minor}"),
            date,
        })
        .await
        .unwrap()
}
