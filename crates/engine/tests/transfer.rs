use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use engine::{
    AccountKind, CorrectionCmd, Engine, EngineError, EntryKind, MoneyCents, OpenAccountCmd,
    TransferCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    // One connection: every pooled connection would otherwise see its own
    // empty in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn open(engine: &Engine, user_id: Uuid, name: &str, cents: i64) -> i32 {
    engine
        .open_account(OpenAccountCmd::new(user_id, name).balance(MoneyCents::new(cents)))
        .await
        .unwrap()
        .id
}

async fn balance(engine: &Engine, user_id: Uuid, account_id: i32) -> i64 {
    engine
        .account(user_id, account_id)
        .await
        .unwrap()
        .balance
        .cents()
}

#[tokio::test]
async fn transfer_moves_money_and_returns_settlement() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 50_00).await;

    let result = engine
        .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(30_00)))
        .await
        .unwrap();

    assert_eq!(result.from.id, x);
    assert_eq!(result.from.name, "Bank");
    assert_eq!(result.from.balance, MoneyCents::new(70_00));
    assert_eq!(result.from.change, MoneyCents::new(-30_00));
    assert_eq!(result.dest.id, y);
    assert_eq!(result.dest.balance, MoneyCents::new(80_00));
    assert_eq!(result.dest.change, MoneyCents::new(30_00));
    assert_eq!(result.date.timestamp_subsec_nanos(), 0);

    assert_eq!(balance(&engine, alice, x).await, 70_00);
    assert_eq!(balance(&engine, alice, y).await, 80_00);
}

#[tokio::test]
async fn transfer_writes_one_linked_pair() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 0).await;

    let result = engine
        .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(12_34)))
        .await
        .unwrap();

    let from_entries = engine.account_entries(alice, x, 10).await.unwrap();
    let dest_entries = engine.account_entries(alice, y, 10).await.unwrap();
    let debit = from_entries
        .iter()
        .find(|e| e.kind == EntryKind::Transfer)
        .unwrap();
    assert_eq!(dest_entries.len(), 1);
    let credit = &dest_entries[0];

    assert_eq!(debit.amount + credit.amount, MoneyCents::ZERO);
    assert_eq!(credit.amount, MoneyCents::new(12_34));
    assert_eq!(debit.linked_entry_id, Some(credit.id));
    assert_eq!(credit.linked_entry_id, Some(debit.id));
    assert_eq!(debit.created_at, result.date);
    assert_eq!(credit.created_at, result.date);
    assert_eq!(credit.user_id, alice);
}

#[tokio::test]
async fn transfer_from_foreign_account_is_unauthorized_without_changes() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let bob = engine.create_user("bob", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 50_00).await;
    let bob_account = open(&engine, bob, "Bob", 0).await;

    let err = engine
        .transfer(TransferCmd::new(bob, x, y, MoneyCents::new(10_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .transfer(TransferCmd::new(bob, x, 9_999, MoneyCents::new(10_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .transfer(TransferCmd::new(alice, x, bob_account, MoneyCents::new(10_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    assert_eq!(balance(&engine, alice, x).await, 100_00);
    assert_eq!(balance(&engine, alice, y).await, 50_00);
    assert_eq!(balance(&engine, bob, bob_account).await, 0);
    assert!(
        engine
            .account_entries(alice, y, 10)
            .await
            .unwrap()
            .iter()
            .all(|e| e.kind != EntryKind::Transfer)
    );
}

#[tokio::test]
async fn invalid_commands_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 0).await;

    let err = engine
        .transfer(TransferCmd::new(alice, x, x, MoneyCents::new(10_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    for cents in [0, -5_00] {
        let err = engine
            .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(cents)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    let err = engine
        .transfer(TransferCmd::new(alice, 9_999, y, MoneyCents::new(1_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    assert_eq!(balance(&engine, alice, x).await, 100_00);
    assert_eq!(balance(&engine, alice, y).await, 0);
}

#[tokio::test]
async fn destination_kind_must_match_when_given() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let shop = engine
        .open_account(OpenAccountCmd::new(alice, "Shop").kind(AccountKind::External))
        .await
        .unwrap()
        .id;

    let err = engine
        .transfer(TransferCmd::new(alice, x, shop, MoneyCents::new(5_00)).dest_kind(AccountKind::Own))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let result = engine
        .transfer(
            TransferCmd::new(alice, x, shop, MoneyCents::new(5_00))
                .dest_kind(AccountKind::External),
        )
        .await
        .unwrap();
    assert_eq!(result.dest.kind, AccountKind::External);
    assert_eq!(result.dest.balance, MoneyCents::new(5_00));
}

#[tokio::test]
async fn overdraft_is_allowed() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 0).await;

    let result = engine
        .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(150_00)))
        .await
        .unwrap();
    assert_eq!(result.from.balance, MoneyCents::new(-50_00));
    assert_eq!(result.dest.balance, MoneyCents::new(150_00));
}

#[tokio::test]
async fn opposite_transfers_run_concurrently_without_losing_updates() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 100_00).await;
    let y = open(&engine, alice, "Wallet", 50_00).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let forward = Arc::clone(&engine);
        tasks.spawn(async move {
            forward
                .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(1_00)))
                .await
        });
        let backward = Arc::clone(&engine);
        tasks.spawn(async move {
            backward
                .transfer(TransferCmd::new(alice, y, x, MoneyCents::new(2_00)))
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(balance(&engine, alice, x).await, 110_00);
    assert_eq!(balance(&engine, alice, y).await, 40_00);
}

#[tokio::test]
async fn correction_records_income_or_expense() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Bank", 0).await;

    let account = engine
        .correct(CorrectionCmd::new(alice, x, MoneyCents::new(5_00)))
        .await
        .unwrap();
    assert_eq!(account.balance, MoneyCents::new(5_00));

    let account = engine
        .correct(CorrectionCmd::new(alice, x, MoneyCents::new(-3_00)))
        .await
        .unwrap();
    assert_eq!(account.balance, MoneyCents::new(2_00));

    let kinds: Vec<EntryKind> = engine
        .account_entries(alice, x, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&EntryKind::Income));
    assert!(kinds.contains(&EntryKind::Expense));

    let err = engine
        .correct(CorrectionCmd::new(alice, x, MoneyCents::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn balance_overflow_is_invalid_input_and_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "password").await.unwrap();
    let x = open(&engine, alice, "Vault", i64::MAX - 10).await;
    let y = open(&engine, alice, "Wallet", 0).await;

    let err = engine
        .transfer(TransferCmd::new(alice, y, x, MoneyCents::new(1_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{err}");

    assert_eq!(balance(&engine, alice, x).await, i64::MAX - 10);
    assert_eq!(balance(&engine, alice, y).await, 0);
    assert!(engine.account_entries(alice, y, 10).await.unwrap().is_empty());

    let err = engine
        .correct(CorrectionCmd::new(alice, x, MoneyCents::new(11)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{err}");

    let account = engine
        .correct(CorrectionCmd::new(alice, x, MoneyCents::new(10)))
        .await
        .unwrap();
    assert_eq!(account.balance, MoneyCents::new(i64::MAX));
}
