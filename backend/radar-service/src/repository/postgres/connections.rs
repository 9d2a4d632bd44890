use crate::error::{AppError, AppResult};
use crate::models::{Connection, ConnectionStatus};
use crate::repository::ConnectionRepository;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresConnectionRepository {
    pool: PgPool,
}

impl PostgresConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConnectionRepository for PostgresConnectionRepository {
    async fn insert(&self, connection: &Connection) -> AppResult<Connection> {
        // uq_connections_pair enforces one row per unordered pair
        let result = sqlx::query_as::<_, Connection>(
            r#"
            INSERT INTO connections (id, sender_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sender_id, receiver_id, status, created_at, updated_at
            "#,
        )
        .bind(connection.id)
        .bind(connection.sender_id)
        .bind(connection.receiver_id)
        .bind(connection.status)
        .bind(connection.created_at)
        .bind(connection.updated_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) if AppError::is_unique_violation(&e) => Err(AppError::Conflict(
                "a connection between these users already exists".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>> {
        let row = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Connection>> {
        let row = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connections
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn transition(
        &self,
        id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> AppResult<Option<Connection>> {
        let row = sqlx::query_as::<_, Connection>(
            r#"
            UPDATE connections
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
            RETURNING id, sender_id, receiver_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConnectionStatus>,
    ) -> AppResult<Vec<Connection>> {
        let rows = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connections
            WHERE (sender_id = $1 OR receiver_id = $1)
              AND ($2::connection_status IS NULL OR status = $2)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_sent_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM connections
            WHERE sender_id = $1 AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn has_accepted_between(&self, a: Uuid, b: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM connections
                WHERE status = 'accepted'
                  AND ((sender_id = $1 AND receiver_id = $2)
                    OR (sender_id = $2 AND receiver_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
