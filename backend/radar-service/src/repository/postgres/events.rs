use crate::error::AppResult;
use crate::geo::{GeoPredicate, RadiusQuery};
use crate::models::{Event, EventWithDistance};
use crate::repository::EventRepository;
use sqlx::{PgPool, Postgres, QueryBuilder};

#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventRepository for PostgresEventRepository {
    async fn insert(&self, event: &Event) -> AppResult<Event> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, organizer_id, title, description, latitude, longitude, starts_at,
                is_boosted, boosted_at, boost_expires_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, organizer_id, title, description, latitude, longitude, starts_at,
                      is_boosted, boosted_at, boost_expires_at, created_at
            "#,
        )
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.starts_at)
        .bind(event.is_boosted)
        .bind(event.boosted_at)
        .bind(event.boost_expires_at)
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn nearby(&self, query: &RadiusQuery) -> AppResult<Vec<EventWithDistance>> {
        let predicate = GeoPredicate::new(*query);
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT e.id, e.organizer_id, e.title, e.description, e.latitude, e.longitude, \
             e.starts_at, e.is_boosted, e.boosted_at, e.boost_expires_at, e.created_at, ",
        );
        predicate.distance_to(&mut qb, "e.geog");
        qb.push(" AS distance FROM events e WHERE ");
        predicate.within_radius(&mut qb, "e.geog");
        qb.push(" ORDER BY distance ASC");
        predicate.limit(&mut qb);

        let rows = qb
            .build_query_as::<EventWithDistance>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
