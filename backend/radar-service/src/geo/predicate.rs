use super::RadiusQuery;
use sqlx::{Postgres, QueryBuilder};

/// Emits PostGIS fragments for a [`RadiusQuery`] into a `QueryBuilder`.
///
/// Coordinates and radius are always pushed as bind parameters. Column names
/// are `'static` so only compile-time identifiers reach the SQL text.
#[derive(Debug, Clone, Copy)]
pub struct GeoPredicate {
    query: RadiusQuery,
}

impl GeoPredicate {
    pub fn new(query: RadiusQuery) -> Self {
        Self { query }
    }

    fn push_center(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("ST_SetSRID(ST_MakePoint(");
        qb.push_bind(self.query.center.longitude);
        qb.push(", ");
        qb.push_bind(self.query.center.latitude);
        qb.push("), 4326)::geography");
    }

    /// `ST_DWithin(<geog_col>, <center>, <radius>)`
    pub fn within_radius(&self, qb: &mut QueryBuilder<'_, Postgres>, geog_col: &'static str) {
        qb.push("ST_DWithin(");
        qb.push(geog_col);
        qb.push(", ");
        self.push_center(qb);
        qb.push(", ");
        qb.push_bind(self.query.radius_meters);
        qb.push(")");
    }

    /// `ST_Distance(<geog_col>, <center>)`, meters
    pub fn distance_to(&self, qb: &mut QueryBuilder<'_, Postgres>, geog_col: &'static str) {
        qb.push("ST_Distance(");
        qb.push(geog_col);
        qb.push(", ");
        self.push_center(qb);
        qb.push(")");
    }

    pub fn limit(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" LIMIT ");
        qb.push_bind(self.query.limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parameterised_dwithin() {
        let query = RadiusQuery::new(10.0, 20.0, 500.0).unwrap();
        let predicate = GeoPredicate::new(query);

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        predicate.distance_to(&mut qb, "u.geog");
        qb.push(" AS distance FROM users u WHERE ");
        predicate.within_radius(&mut qb, "u.geog");
        predicate.limit(&mut qb);

        let sql = qb.sql();
        assert_eq!(
            sql,
            "SELECT ST_Distance(u.geog, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) \
             AS distance FROM users u WHERE ST_DWithin(u.geog, \
             ST_SetSRID(ST_MakePoint($3, $4), 4326)::geography, $5) LIMIT $6"
        );
    }
}
