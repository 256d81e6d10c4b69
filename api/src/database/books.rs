use super::schema::BOOKS;
use super::types::Database;
use anyhow::{Context, Result};
use query_filter::{ColumnRef, CompareOp, Predicate, QuerySet, SqlValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BOOK_COLUMNS: &str = "id, title, description, cover, price, author_id, created, updated";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    /// Smallest currency unit.
    pub price: i64,
    pub author_id: Option<i64>,
    pub created: String,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub author_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover: Option<String>,
    #[serde(default)]
    pub price: i64,
}

impl Database {
    pub async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let id = sqlx::query(
            "INSERT INTO books (title, description, cover, price, author_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.cover)
        .bind(book.price)
        .bind(book.author_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::info!("Published book {} by author {}", id, book.author_id);

        self.get_book(id)
            .await?
            .context("Book vanished right after insert")
    }

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = ?",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Books matching every filter, ordered by id.
    pub async fn search_books(&self, filters: Option<&[Value]>) -> Result<Vec<Book>> {
        let query = query_filter::search(QuerySet::all(&BOOKS), &BOOKS, filters)?;
        self.fetch_compiled(&query).await
    }

    /// Same as [`Database::search_books`], restricted to one author.
    pub async fn search_books_by_author(
        &self,
        author_id: i64,
        filters: Option<&[Value]>,
    ) -> Result<Vec<Book>> {
        let base = QuerySet::all(&BOOKS).filter(Predicate::Compare {
            column: ColumnRef::new(0, "author_id"),
            op: CompareOp::Eq,
            value: SqlValue::Integer(author_id),
        });
        let query = query_filter::search(base, &BOOKS, filters)?;
        self.fetch_compiled(&query).await
    }
}

#[cfg(test)]
mod tests;
