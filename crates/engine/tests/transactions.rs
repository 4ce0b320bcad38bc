use engine::{EngineError, MoneyCents, SplitCmd, TransactionListFilter};

mod common;

use common::{day, engine_with_db, expense};

async fn split(engine: &engine::Engine, tx_id: uuid::Uuid, owner: &str, friends: &[&str]) {
    engine
        .split_transaction(SplitCmd {
            transaction_id: tx_id,
            user_id: owner.to_string(),
            friend_ids: friends.iter().map(|f| f.to_string()).collect(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn participant_sees_transaction_owned_by_someone_else() {
    let (engine, _db) = engine_with_db().await;
    let tx_id = expense(&engine, "dana", 300_00, day(2025, 3, 18)).await;
    split(&engine, tx_id, "dana", &["charlie"]).await;

    let listed = engine
        .list_transactions("charlie", &TransactionListFilter::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    let detail = &listed[0];
    assert_eq!(detail.transaction.id, tx_id);
    assert_ne!(detail.transaction.user_id, "charlie");
    assert_eq!(detail.owner.email, "dana@example.com");
    assert_eq!(detail.splits.len(), 1);
    assert_eq!(detail.splits[0].user.id, "charlie");
    assert_eq!(detail.splits[0].split.amount_minor, 150_00);
}

#[tokio::test]
async fn unrelated_transactions_are_hidden() {
    let (engine, _db) = engine_with_db().await;
    let alice_tx = expense(&engine, "alice", 10_00, day(2025, 3, 15)).await;
    let bob_tx = expense(&engine, "bob", 20_00, day(2025, 3, 16)).await;
    split(&engine, bob_tx, "bob", &["charlie"]).await;

    let listed = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();

    let ids: Vec<_> = listed.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![alice_tx]);
}

#[tokio::test]
async fn listing_is_newest_first_across_owned_and_shared() {
    let (engine, _db) = engine_with_db().await;
    let older = expense(&engine, "alice", 10_00, day(2025, 3, 15)).await;
    let shared = expense(&engine, "bob", 20_00, day(2025, 3, 17)).await;
    let newest = expense(&engine, "alice", 30_00, day(2025, 3, 20)).await;
    split(&engine, shared, "bob", &["alice"]).await;

    let listed = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();

    let ids: Vec<_> = listed.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![newest, shared, older]);
}

#[tokio::test]
async fn issplit_filter_applies_to_owned_and_shared() {
    let (engine, _db) = engine_with_db().await;
    let plain = expense(&engine, "alice", 10_00, day(2025, 3, 15)).await;
    let owned_split = expense(&engine, "alice", 60_00, day(2025, 3, 16)).await;
    let shared_split = expense(&engine, "bob", 90_00, day(2025, 3, 17)).await;
    split(&engine, owned_split, "alice", &["bob"]).await;
    split(&engine, shared_split, "bob", &["alice", "charlie"]).await;

    let only_split = TransactionListFilter {
        issplit: Some(true),
        ..Default::default()
    };
    let listed = engine.list_transactions("alice", &only_split).await.unwrap();
    assert!(listed.iter().all(|d| d.transaction.issplit));
    let ids: Vec<_> = listed.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![shared_split, owned_split]);

    let not_split = TransactionListFilter {
        issplit: Some(false),
        ..Default::default()
    };
    let listed = engine.list_transactions("alice", &not_split).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![plain]);
}

#[tokio::test]
async fn date_and_amount_bounds_are_inclusive() {
    let (engine, _db) = engine_with_db().await;
    let _early = expense(&engine, "alice", 10_00, day(2025, 3, 10)).await;
    let low = expense(&engine, "alice", 20_00, day(2025, 3, 15)).await;
    let high = expense(&engine, "alice", 50_00, day(2025, 3, 16)).await;
    let _big = expense(&engine, "alice", 500_00, day(2025, 3, 16)).await;

    let filter = TransactionListFilter {
        start: Some(day(2025, 3, 15)),
        end: Some(day(2025, 3, 16)),
        min_amount: Some(MoneyCents::new(20_00)),
        max_amount: Some(MoneyCents::new(50_00)),
        ..Default::default()
    };
    let listed = engine.list_transactions("alice", &filter).await.unwrap();

    let ids: Vec<_> = listed.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![high, low]);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let filter = TransactionListFilter {
        min_amount: Some(MoneyCents::new(50_00)),
        max_amount: Some(MoneyCents::new(10_00)),
        ..Default::default()
    };
    let err = engine.list_transactions("alice", &filter).await.unwrap_err();

    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn new_transaction_validates_owner_and_amount() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_transaction(engine::NewTransactionCmd {
            user_id: "nobody".to_string(),
            amount_minor: 10_00,
            description: "Coffee".to_string(),
            date: day(2025, 3, 15),
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user nobody".to_string()));

    let err = engine
        .new_transaction(engine::NewTransactionCmd {
            user_id: "alice".to_string(),
            amount_minor: 0,
            description: "Coffee".to_string(),
            date: day(2025, 3, 15),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}
