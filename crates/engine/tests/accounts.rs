use sea_orm::{ConnectOptions, Database};

use engine::{
    AccountKind, AccountPatch, Engine, EngineError, EntryKind, MoneyCents, OpenAccountCmd,
    TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn opening_balance_is_recorded_as_an_entry() {
    let engine = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();

    let account = engine
        .open_account(
            OpenAccountCmd::new(alice, "  Bank  ")
                .kind(AccountKind::Own)
                .balance(MoneyCents::new(25_00)),
        )
        .await
        .unwrap();
    assert_eq!(account.name, "Bank");
    assert_eq!(account.balance, MoneyCents::new(25_00));

    let entries = engine.account_entries(alice, account.id, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Income);
    assert_eq!(entries[0].amount, MoneyCents::new(25_00));
}

#[tokio::test]
async fn open_account_validates_references() {
    let engine = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();

    let err = engine
        .open_account(OpenAccountCmd::new(alice, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .open_account(OpenAccountCmd::new(alice, "Bank").category_id(42))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let category = engine.create_category(alice, "Savings").await.unwrap();
    let account = engine
        .open_account(OpenAccountCmd::new(alice, "Bank").category_id(category))
        .await
        .unwrap();
    assert_eq!(account.category_id, Some(category));
}

#[tokio::test]
async fn list_accounts_is_paginated_per_user() {
    let engine = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let bob = engine.create_user("bob", "password").await.unwrap();
    for name in ["A", "B", "C", "D", "E"] {
        engine
            .open_account(OpenAccountCmd::new(alice, name))
            .await
            .unwrap();
    }
    engine
        .open_account(OpenAccountCmd::new(bob, "Bob"))
        .await
        .unwrap();

    let first = engine.list_accounts(alice, 0, 2).await.unwrap();
    assert_eq!(first.total, 5);
    assert_eq!(first.remaining_pages, 2);
    let names: Vec<_> = first.items.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);

    let last = engine.list_accounts(alice, 2, 2).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.remaining_pages, 0);

    let err = engine.list_accounts(alice, 0, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn update_account_patches_only_given_fields() {
    let engine = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let bob = engine.create_user("bob", "password").await.unwrap();
    let account = engine
        .open_account(OpenAccountCmd::new(alice, "Bank").balance(MoneyCents::new(10_00)))
        .await
        .unwrap();

    let updated = engine
        .update_account(
            alice,
            account.id,
            AccountPatch {
                kind: Some(AccountKind::External),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Bank");
    assert_eq!(updated.kind, AccountKind::External);
    assert_eq!(updated.balance, MoneyCents::new(10_00));

    let err = engine
        .update_account(alice, account.id, AccountPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .update_account(
            bob,
            account.id,
            AccountPatch {
                name: Some("Mine".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine.account(bob, account.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn entries_are_listed_newest_first() {
    let engine = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = engine
        .open_account(OpenAccountCmd::new(alice, "Bank").balance(MoneyCents::new(10_00)))
        .await
        .unwrap()
        .id;
    let y = engine
        .open_account(OpenAccountCmd::new(alice, "Wallet"))
        .await
        .unwrap()
        .id;
    engine
        .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(1_00)))
        .await
        .unwrap();

    let entries = engine.account_entries(alice, x, 10).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Transfer);
    assert_eq!(entries[1].kind, EntryKind::Income);

    let limited = engine.account_entries(alice, x, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}
