// crates/frog-growth-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Override table could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid site id '{value}' in collect_siteid '{raw}'")]
    InvalidSiteId { raw: String, value: String },

    #[error("collect_siteid '{0}' lists more than three sites")]
    TooManyCollectSites(String),

    #[error("individuals with more than one relocation record: {}", .0.join(", "))]
    DuplicateRelocation(Vec<String>),

    #[error("relocation join changed the row count from {expected} to {found}")]
    JoinMultiplicity { expected: usize, found: usize },

    #[error("site {site_id} appears in more than one population override list: {}", .lists.join(", "))]
    AmbiguousClassification { site_id: i32, lists: Vec<String> },

    #[error("unknown relocation type '{0}'")]
    UnknownRelocationType(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
