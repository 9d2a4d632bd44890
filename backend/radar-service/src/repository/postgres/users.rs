use crate::error::AppResult;
use crate::geo::{GeoPoint, GeoPredicate, RadiusQuery};
use crate::models::{User, UserSummary, UserWithDistance};
use crate::repository::UserRepository;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const USER_COLUMNS: &str = "u.id, u.email, u.display_name, u.avatar_url, u.bio, u.age, \
    u.latitude, u.longitude, u.location_updated_at, u.is_visible, u.invisible_mode, \
    u.is_verified, u.show_age, u.show_location, u.plan, u.device_token, u.created_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, display_name, avatar_url, is_verified
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn nearby(&self, query: &RadiusQuery, exclude: Uuid) -> AppResult<Vec<UserWithDistance>> {
        let predicate = GeoPredicate::new(*query);
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        qb.push(USER_COLUMNS);
        qb.push(", ");
        predicate.distance_to(&mut qb, "u.geog");
        qb.push(" AS distance FROM users u WHERE u.id <> ");
        qb.push_bind(exclude);
        qb.push(
            " AND u.is_verified AND u.is_visible AND NOT u.invisible_mode \
             AND u.geog IS NOT NULL AND ",
        );
        predicate.within_radius(&mut qb, "u.geog");
        qb.push(" ORDER BY distance ASC");
        predicate.limit(&mut qb);

        let rows = qb
            .build_query_as::<UserWithDistance>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_location(&self, id: Uuid, point: GeoPoint) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users AS u \
             SET latitude = $2, longitude = $3, location_updated_at = NOW() \
             WHERE u.id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(point.latitude)
            .bind(point.longitude)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_visibility(
        &self,
        id: Uuid,
        is_visible: Option<bool>,
        invisible_mode: Option<bool>,
    ) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users AS u \
             SET is_visible = COALESCE($2, u.is_visible), \
                 invisible_mode = COALESCE($3, u.invisible_mode) \
             WHERE u.id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(is_visible)
            .bind(invisible_mode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
