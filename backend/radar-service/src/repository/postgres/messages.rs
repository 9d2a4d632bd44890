use crate::error::AppResult;
use crate::models::{Message, NewMessage};
use crate::repository::MessageRepository;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert(&self, message: NewMessage) -> AppResult<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content, media_url, signal_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, receiver_id, content, media_url, signal_id,
                      is_read, created_at, deleted_for
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.content)
        .bind(message.media_url)
        .bind(message.signal_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, content, media_url, signal_id,
                   is_read, created_at, deleted_for
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_between(&self, viewer: Uuid, other: Uuid) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, content, media_url, signal_id,
                   is_read, created_at, deleted_for
            FROM messages
            WHERE ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
              AND NOT ($1 = ANY(deleted_for))
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(viewer)
        .bind(other)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, content, media_url, signal_id,
                   is_read, created_at, deleted_for
            FROM messages
            WHERE (sender_id = $1 OR receiver_id = $1)
              AND NOT ($1 = ANY(deleted_for))
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE receiver_id = $1 AND id = ANY($2) AND NOT is_read
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE receiver_id = $1 AND NOT is_read AND NOT ($1 = ANY(deleted_for))
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_for_user(&self, message_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted_for = array_append(deleted_for, $2)
            WHERE id = $1 AND NOT ($2 = ANY(deleted_for))
            "#,
        )
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_conversation(&self, user_id: Uuid, other: Uuid) -> AppResult<u64> {
        // single statement: the whole thread is hidden or nothing is
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted_for = array_append(deleted_for, $1)
            WHERE ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
              AND NOT ($1 = ANY(deleted_for))
            "#,
        )
        .bind(user_id)
        .bind(other)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
