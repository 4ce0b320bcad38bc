//! Demo data set: five users, a few friend edges and four transactions, two
//! of them split.

use chrono::{DateTime, NaiveDate, Utc};
use engine::{Engine, EngineError, NewTransactionCmd, SplitCmd, User};

use crate::BoxError;

const USERS: [(&str, &str, &str); 5] = [
    ("550e8400-e29b-41d4-a716-446655440000", "alice@example.com", "Alice Johnson"),
    ("550e8400-e29b-41d4-a716-446655440001", "bob@example.com", "Bob Smith"),
    ("550e8400-e29b-41d4-a716-446655440002", "charlie@example.com", "Charlie Brown"),
    ("71f856ca-47a8-4e86-bb46-d1ce8c61fd00", "dana@example.com", "Dana Scully"),
    ("715c2452-b13a-4bac-a0d9-be36778ce733", "erin@example.com", "Erin Hale"),
];

/// (user index, friend index)
const FRIENDS: [(usize, usize); 4] = [(0, 1), (0, 2), (1, 2), (3, 4)];

/// (owner index, cents, description, day of March 2025, split with)
const TRANSACTIONS: [(usize, i64, &str, u32, Option<usize>); 4] = [
    (3, 100_00, "Lunch at Cafe", 15, None),
    (3, 200_00, "Movie tickets", 16, Some(4)),
    (4, 150_00, "Groceries", 17, None),
    (4, 300_00, "Dinner at Restaurant", 18, Some(3)),
];

fn march(day: u32) -> Result<DateTime<Utc>, BoxError> {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid seed date: 2025-03-{day}").into())
}

pub async fn run(engine: &Engine) -> Result<(), BoxError> {
    let mut users = Vec::with_capacity(USERS.len());
    for (id, email, name) in USERS {
        let user = User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            avatar_url: None,
            google_id: Some(id.to_string()),
        };
        let user = match engine.create_user(&user).await {
            Ok(user) => user,
            Err(EngineError::ExistingKey(_)) => engine.user_by_email(email).await?,
            Err(err) => return Err(err.into()),
        };
        users.push(user);
    }
    println!("users seeded");

    for (user, friend) in FRIENDS {
        match engine.add_friend(&users[user].id, &users[friend].id).await {
            Ok(()) | Err(EngineError::ExistingKey(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }
    println!("friend relationships seeded");

    for (owner, cents, description, day, split_with) in TRANSACTIONS {
        let id = engine
            .new_transaction(NewTransactionCmd {
                user_id: users[owner].id.clone(),
                amount_minor: cents,
                description: description.to_string(),
                date: march(day)?,
            })
            .await?;
        if let Some(friend) = split_with {
            engine
                .split_transaction(SplitCmd {
                    transaction_id: id,
                    user_id: users[owner].id.clone(),
                    friend_ids: vec![users[friend].id.clone()],
                })
                .await?;
        }
    }
    println!("transactions and splits seeded");

    Ok(())
}
