use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by duel store backends regardless of the underlying database.
///
/// Every backend failure collapses to "unavailable": the service has no
/// partial-failure handling beyond degraded mode, and the wrapped source
/// keeps the backend-specific detail for the logs.
#[derive(Debug, Error)]
#[error("duel storage unavailable: {message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError {
            message,
            source: Box::new(source),
        }
    }
}
