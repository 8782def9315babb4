//! PostgreSQL implementation of the list backend.
//!
//! Records live in a single table keyed by a signed position. Head
//! insertion takes a position one below the current minimum, so ordering
//! by position ascending yields the list head first.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::ListBackend;
use crate::config::BoardConfig;
use crate::domain::Message;
use crate::error::BoardError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS board_messages (\
     position BIGINT PRIMARY KEY, \
     payload JSONB NOT NULL)";

/// PostgreSQL-backed [`ListBackend`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresListBackend {
    pool: PgPool,
}

impl PostgresListBackend {
    /// Creates a backend over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database configured in `config` and makes sure the
    /// `board_messages` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the connection or the schema
    /// statement fails.
    pub async fn connect(config: &BoardConfig) -> Result<Self, BoardError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let backend = Self::new(pool);
        backend.ensure_schema().await?;
        Ok(backend)
    }

    /// Creates the `board_messages` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), BoardError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn to_record(message: &Message) -> Result<serde_json::Value, BoardError> {
    serde_json::to_value(message).map_err(|e| BoardError::BackingStore(e.to_string()))
}

#[async_trait]
impl ListBackend for PostgresListBackend {
    async fn push_front(&self, message: &Message) -> Result<(), BoardError> {
        sqlx::query(
            "INSERT INTO board_messages (position, payload) \
             SELECT COALESCE(MIN(position), 0) - 1, $1 FROM board_messages",
        )
        .bind(to_record(message)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn range_all(&self) -> Result<Vec<Message>, BoardError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT payload FROM board_messages ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|payload| {
                serde_json::from_value(payload).map_err(|e| BoardError::BackingStore(e.to_string()))
            })
            .collect()
    }

    async fn clear(&self) -> Result<(), BoardError> {
        sqlx::query("DELETE FROM board_messages")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Rewrites the table inside one transaction, so readers never observe
    /// the cleared intermediate state.
    async fn replace_all(&self, newest_first: &[Message]) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM board_messages")
            .execute(&mut *tx)
            .await?;
        for (position, message) in (0_i64..).zip(newest_first) {
            sqlx::query("INSERT INTO board_messages (position, payload) VALUES ($1, $2)")
                .bind(position)
                .bind(to_record(message)?)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
