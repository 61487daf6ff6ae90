//! `SQLite` connection management with Diesel.

use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::env;

use crate::error::{CatalogError, Result};

/// Type alias for the connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Type alias for a pooled connection.
pub type PooledSqliteConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// `SQLite` connection pool for the station catalog.
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Creates a connection pool from the `DATABASE_URL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is not set or if the pool cannot be created.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| CatalogError::Config("DATABASE_URL environment variable not set".into()))?;
        Self::new(&database_url)
    }

    /// Creates a connection pool against the given `SQLite` file path (or `:memory:`).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created.
    pub fn new(database_url: &str) -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder().max_size(10).build(manager)?;
        Ok(Self { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available.
    pub fn get_connection(&self) -> Result<PooledSqliteConnection> {
        Ok(self.pool.get()?)
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
