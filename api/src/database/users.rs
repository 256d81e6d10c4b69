use super::schema::USERS;
use super::types::Database;
use anyhow::{Context, Result};
use query_filter::QuerySet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const USER_COLUMNS: &str =
    "id, username, email, name, pseudonym, confirmed, role_id, created, updated";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub pseudonym: Option<String>,
    pub confirmed: bool,
    pub role_id: Option<i64>,
    pub created: String,
    pub updated: Option<String>,
}

/// The username or email is already registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateUser {
    pub username: String,
}

impl std::fmt::Display for DuplicateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Username or email already registered: {}", self.username)
    }
}

impl std::error::Error for DuplicateUser {}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub pseudonym: Option<String>,
}

impl Database {
    /// Registers a user with the default role.
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        let role = self
            .get_default_role()
            .await?
            .context("No default role configured")?;

        let id = sqlx::query(
            "INSERT INTO users (username, email, name, pseudonym, role_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.pseudonym)
        .bind(role.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                anyhow::Error::new(DuplicateUser {
                    username: user.username.clone(),
                })
            }
            other => other.into(),
        })?
        .last_insert_rowid();

        tracing::info!("Registered user {} ({}) with role {}", user.username, id, role.name);

        self.get_user(id)
            .await?
            .context("User vanished right after insert")
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Case-insensitive check against both unique columns.
    pub async fn is_username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE LOWER(username) = LOWER(?) OR LOWER(email) = LOWER(?)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Users matching every filter, ordered by id.
    pub async fn search_users(&self, filters: Option<&[Value]>) -> Result<Vec<User>> {
        let query = query_filter::search(QuerySet::all(&USERS), &USERS, filters)?;
        self.fetch_compiled(&query).await
    }
}

#[cfg(test)]
mod tests;
