//! Catalog-crate error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("failed to create connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("{0}")]
    Config(String),

    #[error("failed to read CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV source is missing required column: {0}")]
    MissingColumn(&'static str),
}
