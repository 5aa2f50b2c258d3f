//! Error types for FastTrack storage.

use fasttrack_core::FastTrackError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be decoded into its domain type.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of row.
        entity: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },

    /// A guarded write found the row in a different state than expected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A unique constraint rejected the write.
    #[error("duplicate {entity}: {field} already in use")]
    Duplicate {
        /// The kind of row.
        entity: &'static str,
        /// The unique column.
        field: &'static str,
    },
}

impl StoreError {
    /// Map a write error, turning a unique violation into `Duplicate`.
    pub(crate) fn on_unique(entity: &'static str, field: &'static str) -> impl Fn(sqlx::Error) -> Self {
        move |err| {
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    return Self::Duplicate { entity, field };
                }
            }
            Self::from(err)
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Serialization(err.to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for FastTrackError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Duplicate { entity, field } => Self::Duplicate { entity, field },
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Persistence(msg),
        }
    }
}
