use thiserror::Error;

use slugline_core::error::CoreError;
use slugline_core::record::EntityType;

/// Service layer errors
///
/// `NotFound` and `ConfigurationError` are kept apart so hosts can map a
/// failed lookup and a setup bug to different responses.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] slugline_db::error::DbError),

    #[error(transparent)]
    CoreError(CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Exhausted retries: entity={entity}, attempts={attempts}")]
    ExhaustedRetries { entity: EntityType, attempts: u32 },

    /// Every numeric suffix of the candidate is taken in its scope.
    #[error("No free slug suffix: entity={entity}, candidate={candidate}")]
    SuffixesExhausted {
        entity: EntityType,
        candidate: String,
    },
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigurationError(message) => Self::ConfigurationError(message),
            other => Self::CoreError(other),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
