use sea_orm::{ConnectOptions, Database};

use engine::{Engine, EngineError, GroupRole};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> Engine {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

struct Users {
    owner: Uuid,
    member: Uuid,
    stranger: Uuid,
}

async fn users(engine: &Engine) -> Users {
    Users {
        owner: engine.create_user("owner", "password").await.unwrap(),
        member: engine.create_user("member", "password").await.unwrap(),
        stranger: engine.create_user("stranger", "password").await.unwrap(),
    }
}

#[tokio::test]
async fn owner_manages_members() {
    let engine = engine_with_db().await;
    let u = users(&engine).await;
    let group = engine.create_group(u.owner, "Home", None).await.unwrap();

    engine
        .add_group_member(u.owner, group.id, u.member)
        .await
        .unwrap();

    let view = engine.group(u.member, group.id).await.unwrap();
    assert_eq!(view.role, GroupRole::Member);
    assert_eq!(view.members, vec![u.owner, u.member]);

    let view = engine.group(u.owner, group.id).await.unwrap();
    assert_eq!(view.role, GroupRole::Owner);

    let err = engine.group(u.stranger, group.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn add_member_rules() {
    let engine = engine_with_db().await;
    let u = users(&engine).await;
    let group = engine.create_group(u.owner, "Home", None).await.unwrap();
    engine
        .add_group_member(u.owner, group.id, u.member)
        .await
        .unwrap();

    let err = engine
        .add_group_member(u.member, group.id, u.stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .add_group_member(u.owner, group.id, u.member)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .add_group_member(u.owner, group.id, u.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .add_group_member(u.owner, group.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .add_group_member(u.owner, group.id + 100, u.stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn members_may_leave_but_not_remove_others() {
    let engine = engine_with_db().await;
    let u = users(&engine).await;
    let group = engine.create_group(u.owner, "Home", None).await.unwrap();
    engine
        .add_group_member(u.owner, group.id, u.member)
        .await
        .unwrap();
    engine
        .add_group_member(u.owner, group.id, u.stranger)
        .await
        .unwrap();

    let err = engine
        .remove_group_member(u.member, group.id, u.stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    engine
        .remove_group_member(u.member, group.id, u.member)
        .await
        .unwrap();
    engine
        .remove_group_member(u.owner, group.id, u.stranger)
        .await
        .unwrap();

    let err = engine
        .remove_group_member(u.owner, group.id, u.stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .remove_group_member(u.owner, group.id, u.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let view = engine.group(u.owner, group.id).await.unwrap();
    assert_eq!(view.members, vec![u.owner]);
}

#[tokio::test]
async fn ownership_moves_to_a_member() {
    let engine = engine_with_db().await;
    let u = users(&engine).await;
    let group = engine.create_group(u.owner, "Home", None).await.unwrap();

    let err = engine
        .transfer_group_ownership(u.owner, group.id, u.member)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    engine
        .add_group_member(u.owner, group.id, u.member)
        .await
        .unwrap();
    let moved = engine
        .transfer_group_ownership(u.owner, group.id, u.member)
        .await
        .unwrap();
    assert_eq!(moved.owner_id, u.member);

    let view = engine.group(u.owner, group.id).await.unwrap();
    assert_eq!(view.role, GroupRole::Member);
    assert_eq!(view.members, vec![u.member, u.owner]);

    let err = engine.delete_group(u.owner, group.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn list_and_delete_groups() {
    let engine = engine_with_db().await;
    let u = users(&engine).await;
    let home = engine.create_group(u.owner, "Home", Some(7)).await.unwrap();
    let trip = engine.create_group(u.owner, "Trip", None).await.unwrap();
    engine
        .add_group_member(u.owner, trip.id, u.member)
        .await
        .unwrap();

    let owned = engine
        .list_groups(u.owner, GroupRole::Owner, 0, 10)
        .await
        .unwrap();
    assert_eq!(owned.total, 2);
    assert_eq!(owned.items[0].id, home.id);

    let joined = engine
        .list_groups(u.member, GroupRole::Member, 0, 10)
        .await
        .unwrap();
    assert_eq!(joined.total, 1);
    assert_eq!(joined.items[0].name, "Trip");

    engine.delete_group(u.owner, trip.id).await.unwrap();
    let joined = engine
        .list_groups(u.member, GroupRole::Member, 0, 10)
        .await
        .unwrap();
    assert_eq!(joined.total, 0);

    let err = engine.group(u.owner, trip.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.create_group(u.owner, " ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}
