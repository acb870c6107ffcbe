//! Error taxonomy for the pipeline. Each stage has its own error type;
//! any of them aborts the whole run.

/// Transport failures during extraction. Retry/backoff is the scheduler's
/// business, not ours.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP status code error: upstream API returned HTTP status code {0}")]
    StatusCode(u16),
    #[error("Could not reach the content API: {0}")]
    Http(#[from] reqwest::Error),
}

/// A raw payload did not carry a field the article record requires.
#[derive(thiserror::Error, Debug)]
pub enum MappingError {
    #[error("Required field `{0}` missing from the raw payload")]
    MissingField(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Unknown column `{0}` in filter")]
    UnknownColumn(String),
    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Transformation failed: {0}")]
    Mapping(#[from] MappingError),
    #[error("Load failed: {0}")]
    Store(#[from] StoreError),
}
