//! Diesel row types for the `stations` table.

use crate::schema::stations;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use planner_types::Station;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = stations)]
pub struct StationRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price_milli_dollars: i64,
    pub canonical_key: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geocode_attempts: i32,
    pub geocode_failed: bool,
    pub last_geocoded_at: Option<NaiveDateTime>,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            price_milli_dollars: row.price_milli_dollars,
            canonical_key: row.canonical_key,
            latitude: row.latitude,
            longitude: row.longitude,
            geocode_attempts: row.geocode_attempts,
            geocode_failed: row.geocode_failed,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stations)]
pub struct NewStation {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price_milli_dollars: i64,
    pub canonical_key: String,
}
