use super::*;
use crate::database::test_helpers::{create_test_user, seed_bookstore, setup_test_db};
use serde_json::json;

#[tokio::test]
async fn test_create_user_gets_default_role() {
    let db = setup_test_db().await;
    let user = db
        .create_user(&NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: Some("Alice".to_string()),
            pseudonym: None,
        })
        .await
        .unwrap();

    let default = db.get_default_role().await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.role_id, Some(default.id));
    assert!(!user.confirmed);
    assert_eq!(user.created.len(), "2024-01-01 00:00:00".len());
    assert!(user.updated.is_none());
}

#[tokio::test]
async fn test_duplicate_user_rejected() {
    let db = setup_test_db().await;
    create_test_user(&db, "alice").await;

    assert!(db
        .is_username_or_email_taken("ALICE", "other@example.com")
        .await
        .unwrap());
    assert!(db
        .is_username_or_email_taken("bob", "Alice@Example.com")
        .await
        .unwrap());
    assert!(!db
        .is_username_or_email_taken("bob", "bob@example.com")
        .await
        .unwrap());

    let duplicate = NewUser {
        username: "alice".to_string(),
        email: "alice2@example.com".to_string(),
        name: None,
        pseudonym: None,
    };
    let err = db.create_user(&duplicate).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<DuplicateUser>(),
        Some(&DuplicateUser {
            username: "alice".to_string()
        })
    );

    let same_email = NewUser {
        username: "alice2".to_string(),
        email: "alice@example.com".to_string(),
        name: None,
        pseudonym: None,
    };
    let err = db.create_user(&same_email).await.unwrap_err();
    assert!(err.downcast_ref::<DuplicateUser>().is_some());
}

#[tokio::test]
async fn test_get_user() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "alice").await;

    let loaded = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.email, "alice@example.com");
    assert!(db.get_user(user.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_users() {
    let db = setup_test_db().await;
    let author = seed_bookstore(&db).await;
    let reader = create_test_user(&db, "reader").await;

    let all = db.search_users(None).await.unwrap();
    assert_eq!(
        all.iter().map(|u| u.id).collect::<Vec<_>>(),
        vec![author.id, reader.id]
    );

    let unconfirmed = [json!({"name": "confirmed", "op": "eq", "val": false})];
    assert_eq!(db.search_users(Some(&unconfirmed[..])).await.unwrap().len(), 2);

    let named = [
        json!({"name": "username", "op": "in", "val": ["reader", "nobody"]}),
        json!({"name": "email", "op": "like", "val": "%@example.com"}),
    ];
    let found = db.search_users(Some(&named[..])).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, reader.id);
}
