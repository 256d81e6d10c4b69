use super::*;
use crate::database::test_helpers::{
    create_test_book, create_test_publisher, seed_bookstore, setup_test_db,
};
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_book() {
    let db = setup_test_db().await;
    let author = create_test_publisher(&db, "author").await;

    let book = db
        .create_book(&NewBook {
            author_id: author.id,
            title: "Dune".to_string(),
            description: Some("Spice".to_string()),
            cover: None,
            price: 999,
        })
        .await
        .unwrap();

    let loaded = db.get_book(book.id).await.unwrap().unwrap();
    assert_eq!(loaded.title.as_deref(), Some("Dune"));
    assert_eq!(loaded.price, 999);
    assert_eq!(loaded.author_id, Some(author.id));
    assert!(db.get_book(book.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_book_requires_existing_author() {
    let db = setup_test_db().await;
    let orphan = NewBook {
        author_id: 42,
        title: "Nobody wrote this".to_string(),
        description: None,
        cover: None,
        price: 0,
    };
    assert!(db.create_book(&orphan).await.is_err());
}

#[tokio::test]
async fn test_search_books() {
    let db = setup_test_db().await;
    seed_bookstore(&db).await;

    assert_eq!(db.search_books(None).await.unwrap().len(), 2);
    assert_eq!(db.search_books(Some(&[][..])).await.unwrap().len(), 2);

    let none = [json!({"name": "price", "op": "ge", "val": 40000})];
    assert!(db.search_books(Some(&none[..])).await.unwrap().is_empty());

    let one = [json!({"name": "price", "op": "ge", "val": 20000})];
    assert_eq!(db.search_books(Some(&one[..])).await.unwrap().len(), 1);

    let sapiens = [json!({"name": "title", "op": "ilike", "val": "%sapiens%"})];
    let found = db.search_books(Some(&sapiens[..])).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].price, 15000);
}

#[tokio::test]
async fn test_search_books_ordered_by_id() {
    let db = setup_test_db().await;
    let author = seed_bookstore(&db).await;
    create_test_book(&db, author.id, "Homo Deus", 20000).await;

    let ids = db
        .search_books(None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect::<Vec<_>>();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_search_books_by_author() {
    let db = setup_test_db().await;
    let author = seed_bookstore(&db).await;
    let other = create_test_publisher(&db, "other").await;
    create_test_book(&db, other.id, "Cheap Thrills", 500).await;

    let mine = db.search_books_by_author(author.id, None).await.unwrap();
    assert_eq!(mine.len(), 2);

    // Client filters narrow the author's books, never widen them.
    let cheap = [json!({"name": "price", "op": "lt", "val": 20000})];
    let mine = db
        .search_books_by_author(author.id, Some(&cheap[..]))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].price, 15000);

    let theirs = db.search_books_by_author(other.id, Some(&cheap[..])).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].title.as_deref(), Some("Cheap Thrills"));
}

#[tokio::test]
async fn test_search_books_rejects_bad_filter() {
    let db = setup_test_db().await;
    seed_bookstore(&db).await;

    let filters = [json!({"name": "price", "op": "eq", "val": null})];
    let err = db.search_books(Some(&filters[..])).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<query_filter::FilterError>(),
        Some(&query_filter::FilterError::ComparisonToNull)
    );
}
