use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No data for account '{account_id}'")]
    NoData { account_id: String },

    #[error("Unsupported horizon: {days} days (expected one of 7, 14, 30, 60, 90)")]
    UnsupportedHorizon { days: i64 },

    #[error("Invalid date '{raw}' in column {column}")]
    InvalidDate { column: &'static str, raw: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ImpactResult<T> = Result<T, ImpactError>;
