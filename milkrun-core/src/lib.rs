pub mod identity;
pub mod repository;

pub use identity::OwnerId;
pub use repository::RecordStore;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Failures reported by a record store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => CoreError::StoreUnavailable(msg),
            StoreError::Duplicate(msg) => CoreError::ConflictError(msg),
            StoreError::Backend(msg) => CoreError::InternalError(msg),
        }
    }
}
