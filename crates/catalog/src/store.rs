//! Station persistence: upsert, bounding-box queries, and geocoding-sweep bookkeeping.

use crate::connection::Database;
use crate::error::Result;
use crate::models::{NewStation, StationRow};
use crate::schema::stations::dsl::{self, stations};
use chrono::Utc;
use diesel::prelude::*;
use planner_types::Station;

/// Rows are paged out of the store this many at a time so a large catalog scan never
/// materializes the whole table at once.
const QUERY_CHUNK_SIZE: i64 = 1000;

/// Wraps a [`Database`] with the catalog's query and mutation surface.
pub struct CatalogStore {
    db: Database,
}

impl CatalogStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the `stations` table if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or statement execution fails.
    pub fn init_schema(&self) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        diesel::sql_query(
            "CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                price_milli_dollars BIGINT NOT NULL,
                canonical_key TEXT NOT NULL UNIQUE,
                latitude DOUBLE PRECISION,
                longitude DOUBLE PRECISION,
                geocode_attempts INTEGER NOT NULL DEFAULT 0,
                geocode_failed BOOLEAN NOT NULL DEFAULT 0,
                last_geocoded_at TIMESTAMP
            )",
        )
        .execute(&mut conn)?;
        Ok(())
    }

    /// Deletes every row. Used by the importer's `--replace` mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn truncate(&self) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        diesel::delete(stations).execute(&mut conn)?;
        Ok(())
    }

    /// Upserts rows keyed on `canonical_key`, keeping whichever price was most recently
    /// imported for a given key.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub fn upsert(&self, rows: &[NewStation]) -> Result<usize> {
        let mut conn = self.db.get_connection()?;
        let mut count = 0;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for row in rows {
                diesel::insert_into(stations)
                    .values(row)
                    .on_conflict(dsl::canonical_key)
                    .do_update()
                    .set((
                        dsl::name.eq(&row.name),
                        dsl::address.eq(&row.address),
                        dsl::city.eq(&row.city),
                        dsl::state.eq(&row.state),
                        dsl::price_milli_dollars.eq(row.price_milli_dollars),
                    ))
                    .execute(conn)?;
                count += 1;
            }
            Ok(())
        })?;

        Ok(count)
    }

    /// Streams geocoded stations within a bounding box, in chunks of 1,000 rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub fn stations_in_bbox(
        &self,
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
    ) -> Result<Vec<Station>> {
        let mut conn = self.db.get_connection()?;
        let mut out = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let chunk: Vec<StationRow> = stations
                .filter(dsl::latitude.ge(min_lat))
                .filter(dsl::latitude.le(max_lat))
                .filter(dsl::longitude.ge(min_lon))
                .filter(dsl::longitude.le(max_lon))
                .filter(dsl::latitude.is_not_null())
                .filter(dsl::longitude.is_not_null())
                .order(dsl::id.asc())
                .limit(QUERY_CHUNK_SIZE)
                .offset(offset)
                .load(&mut conn)?;

            let fetched = chunk.len() as i64;
            out.extend(chunk.into_iter().map(Station::from));

            if fetched < QUERY_CHUNK_SIZE {
                break;
            }
            offset += QUERY_CHUNK_SIZE;
        }

        Ok(out)
    }

    /// Rows with no coordinates yet (or all rows, in `force` mode), capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub fn rows_needing_geocode(&self, limit: i64, force: bool) -> Result<Vec<Station>> {
        let mut conn = self.db.get_connection()?;
        let rows: Vec<StationRow> = if force {
            stations.order(dsl::id.asc()).limit(limit).load(&mut conn)?
        } else {
            stations
                .filter(dsl::latitude.is_null())
                .filter(dsl::geocode_failed.eq(false))
                .order(dsl::id.asc())
                .limit(limit)
                .load(&mut conn)?
        };
        Ok(rows.into_iter().map(Station::from).collect())
    }

    /// Records the outcome of a geocoding attempt for one row.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub fn record_geocode_result(
        &self,
        station_id: i64,
        coordinates: Option<(f64, f64)>,
    ) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let now = Utc::now().naive_utc();

        let failed = coordinates.is_none();
        let (lat, lon) = coordinates.unzip();

        diesel::update(stations.filter(dsl::id.eq(station_id)))
            .set((
                dsl::latitude.eq(lat),
                dsl::longitude.eq(lon),
                dsl::geocode_failed.eq(failed),
                dsl::geocode_attempts.eq(dsl::geocode_attempts + 1),
                dsl::last_geocoded_at.eq(Some(now)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// `(total rows, rows with coordinates)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub fn counts(&self) -> Result<(i64, i64)> {
        let mut conn = self.db.get_connection()?;
        let total: i64 = stations.count().get_result(&mut conn)?;
        let geocoded: i64 = stations
            .filter(dsl::latitude.is_not_null())
            .count()
            .get_result(&mut conn)?;
        Ok((total, geocoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_csv;

    fn test_store() -> CatalogStore {
        let db = Database::new(":memory:").expect("connect");
        let store = CatalogStore::new(db);
        store.init_schema().expect("init schema");
        store
    }

    #[test]
    fn upsert_then_bbox_query_round_trips() {
        let store = test_store();
        let csv = "\
OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price
1,Tulsa Fuel Stop,100 Main St,Tulsa,OK,10,3.200
";
        let rows = normalize_csv(csv.as_bytes()).expect("normalize");
        assert_eq!(store.upsert(&rows).expect("upsert"), 1);

        let (total, geocoded) = store.counts().expect("counts");
        assert_eq!(total, 1);
        assert_eq!(geocoded, 0);

        let pending = store.rows_needing_geocode(10, false).expect("pending");
        assert_eq!(pending.len(), 1);

        store
            .record_geocode_result(pending[0].id, Some((36.15, -95.99)))
            .expect("record");

        let (_, geocoded_after) = store.counts().expect("counts");
        assert_eq!(geocoded_after, 1);

        let in_box = store
            .stations_in_bbox(-96.0, -95.0, 36.0, 36.3)
            .expect("bbox");
        assert_eq!(in_box.len(), 1);

        let outside_box = store
            .stations_in_bbox(-90.0, -89.0, 40.0, 41.0)
            .expect("bbox");
        assert!(outside_box.is_empty());
    }
}
