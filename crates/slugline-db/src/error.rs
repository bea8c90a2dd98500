use thiserror::Error;

use slugline_core::record::EntityType;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    /// The `(scope, slug)` uniqueness constraint rejected a write.
    #[error("Slug conflict: entity={entity}, slug={slug}")]
    SlugConflict { entity: EntityType, slug: String },

    #[error("Record not found: entity={entity}, id={id}")]
    RecordNotFound { entity: EntityType, id: uuid::Uuid },

    #[error("Row decode error: {0}")]
    DecodeError(String),

    #[error(transparent)]
    CoreError(#[from] slugline_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
