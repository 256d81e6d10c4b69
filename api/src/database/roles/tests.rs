use super::*;
use crate::database::test_helpers::{create_test_user, role, setup_test_db};

#[test]
fn test_permission_bits() {
    let publisher = Role {
        id: 2,
        name: "Publisher".to_string(),
        is_default: false,
        permissions: (Permission::VIEW | Permission::PUBLISH).bits(),
        created: "2024-01-01 00:00:00".to_string(),
        updated: None,
    };
    assert!(publisher.has_permission(Permission::VIEW));
    assert!(publisher.has_permission(Permission::PUBLISH));
    assert!(!publisher.has_permission(Permission::ADMIN));
    assert!(publisher.has_permission(Permission::VIEW | Permission::PUBLISH));
    assert!(!publisher.has_permission(Permission::PUBLISH | Permission::ADMIN));
}

#[tokio::test]
async fn test_builtin_roles_inserted() {
    let db = setup_test_db().await;

    let user = role(&db, "User").await;
    assert!(user.is_default);
    assert_eq!(user.permissions, Permission::VIEW.bits());

    let admin = role(&db, "Administrator").await;
    assert!(!admin.is_default);
    assert!(admin.has_permission(Permission::ADMIN | Permission::PUBLISH | Permission::VIEW));

    let default = db.get_default_role().await.unwrap().unwrap();
    assert_eq!(default.name, "User");
}

#[tokio::test]
async fn test_insert_roles_is_idempotent() {
    let db = setup_test_db().await;
    sqlx::query("UPDATE roles SET permissions = 0 WHERE name = 'Publisher'")
        .execute(db.pool())
        .await
        .unwrap();

    db.insert_roles().await.unwrap();
    db.insert_roles().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, BUILTIN_ROLES.len() as i64);
    let publisher = role(&db, "Publisher").await;
    assert!(publisher.has_permission(Permission::PUBLISH));
    assert!(publisher.updated.is_some());
}

#[tokio::test]
async fn test_user_can() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "reader").await;

    assert!(db.user_can(user.id, Permission::VIEW).await.unwrap());
    assert!(!db.user_can(user.id, Permission::PUBLISH).await.unwrap());

    let publisher = role(&db, "Publisher").await;
    db.set_user_role(user.id, publisher.id).await.unwrap();
    assert!(db.user_can(user.id, Permission::PUBLISH).await.unwrap());
    assert!(!db.user_can(user.id, Permission::ADMIN).await.unwrap());

    assert!(!db.user_can(9999, Permission::VIEW).await.unwrap());
}
