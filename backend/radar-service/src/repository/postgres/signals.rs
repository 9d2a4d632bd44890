use crate::error::AppResult;
use crate::geo::{GeoPredicate, RadiusQuery};
use crate::models::{Signal, SignalWithDistance};
use crate::repository::SignalRepository;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresSignalRepository {
    pool: PgPool,
}

impl PostgresSignalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SignalRepository for PostgresSignalRepository {
    async fn insert(&self, signal: &Signal) -> AppResult<Signal> {
        let row = sqlx::query_as::<_, Signal>(
            r#"
            INSERT INTO signals (id, sender_id, note, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, note, created_at
            "#,
        )
        .bind(signal.id)
        .bind(signal.sender_id)
        .bind(&signal.note)
        .bind(signal.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Signal>> {
        let row = sqlx::query_as::<_, Signal>(
            "SELECT id, sender_id, note, created_at FROM signals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn nearby(
        &self,
        query: &RadiusQuery,
        exclude_sender: Uuid,
    ) -> AppResult<Vec<SignalWithDistance>> {
        let predicate = GeoPredicate::new(*query);
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT s.id, s.sender_id, s.note, s.created_at, \
             u.display_name AS sender_display_name, u.avatar_url AS sender_avatar_url, ",
        );
        predicate.distance_to(&mut qb, "u.geog");
        qb.push(
            " AS distance FROM signals s JOIN users u ON u.id = s.sender_id \
             WHERE s.sender_id <> ",
        );
        qb.push_bind(exclude_sender);
        qb.push(" AND u.is_visible AND NOT u.invisible_mode AND u.geog IS NOT NULL AND ");
        predicate.within_radius(&mut qb, "u.geog");
        qb.push(" ORDER BY distance ASC, s.created_at DESC");
        predicate.limit(&mut qb);

        let rows = qb
            .build_query_as::<SignalWithDistance>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
