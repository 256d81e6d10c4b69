/// Shared test helpers for database tests
use super::books::{Book, NewBook};
use super::roles::Role;
use super::users::{NewUser, User};
use super::Database;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Fresh in-memory database with migrations and built-in roles applied.
/// A single connection that never expires keeps the database alive for the
/// whole test.
pub async fn setup_test_db() -> Database {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse in-memory database URL");
    let pool_options = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None);
    Database::connect_with(options, pool_options)
        .await
        .expect("Failed to set up test database")
}

pub async fn create_test_user(db: &Database, username: &str) -> User {
    db.create_user(&NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        name: None,
        pseudonym: None,
    })
    .await
    .expect("Failed to create test user")
}

pub async fn role(db: &Database, name: &str) -> Role {
    db.get_role_by_name(name)
        .await
        .expect("Failed to load role")
        .expect("Built-in role missing")
}

pub async fn create_test_publisher(db: &Database, username: &str) -> User {
    let user = create_test_user(db, username).await;
    let publisher = role(db, "Publisher").await;
    db.set_user_role(user.id, publisher.id)
        .await
        .expect("Failed to promote user");
    user
}

pub async fn create_test_book(db: &Database, author_id: i64, title: &str, price: i64) -> Book {
    db.create_book(&NewBook {
        author_id,
        title: title.to_string(),
        description: None,
        cover: None,
        price,
    })
    .await
    .expect("Failed to create test book")
}

/// Two books by one publisher, priced 150.00 and 300.00.
pub async fn seed_bookstore(db: &Database) -> User {
    let author = create_test_publisher(db, "yuval").await;
    create_test_book(db, author.id, "Sapiens A Brief History of Humankind", 15000).await;
    create_test_book(db, author.id, "21 Lessons for the 21st Century", 30000).await;
    author
}
