use thiserror::Error;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// The upstream analysis call failed or returned unusable results
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// The backing store could not be read
    #[error("cache backend: {0}")]
    Backend(String),
}
