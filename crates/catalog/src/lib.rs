//! Station catalog: CSV normalization, deduplication, and a SQLite-backed store queryable
//! by bounding box.

mod connection;
mod error;
mod models;
mod normalize;
mod schema;
mod store;

pub use connection::Database;
pub use error::{CatalogError, Result};
pub use models::NewStation;
pub use normalize::normalize_csv;
pub use store::CatalogStore;
