use super::types::Database;
use anyhow::Result;
use query_filter::{CompiledQuery, SqlValue};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?;
        Self::connect_with(options, SqlitePoolOptions::new()).await
    }

    /// Opens the pool, applies migrations and makes sure the built-in roles exist.
    pub async fn connect_with(
        options: SqliteConnectOptions,
        pool_options: SqlitePoolOptions,
    ) -> Result<Self> {
        // `like` must not fold case; `ilike` compiles to a Unicode-aware REGEXP.
        let options = options
            .pragma("case_sensitive_like", "ON")
            .with_regexp()
            .foreign_keys(true);
        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!().run(&pool).await?;

        let database = Self { pool };
        database.insert_roles().await?;
        Ok(database)
    }

    /// Runs a compiled search and maps every row to `T`.
    pub(crate) async fn fetch_compiled<T>(&self, query: &CompiledQuery) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, binds) = query.to_sql();
        let mut statement = sqlx::query_as::<_, T>(&sql);
        for value in binds {
            statement = match value {
                SqlValue::Integer(v) => statement.bind(v),
                SqlValue::Float(v) => statement.bind(v),
                SqlValue::Text(v) => statement.bind(v),
                SqlValue::Bool(v) => statement.bind(v),
            };
        }
        Ok(statement.fetch_all(&self.pool).await?)
    }

    /// Test helper method to access the underlying pool
    #[cfg(test)]
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}
