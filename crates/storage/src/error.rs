use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    /// User-facing conflict such as a duplicate registration; the message is
    /// surfaced verbatim.
    #[error("{0}")]
    ConstraintViolation(String),

    /// Operation attempted against the wrong lifecycle state, e.g. reporting
    /// a result for a tournament that is not in progress.
    #[error("{0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Rewrites a unique-constraint failure into a user-facing conflict with
    /// the given message. Every other error passes through unchanged, so this
    /// can sit on any insert that races a uniqueness guarantee.
    pub fn or_conflict(self, message: &str) -> Self {
        if self.is_unique_violation() {
            StorageError::ConstraintViolation(message.to_string())
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_conflict_leaves_unrelated_errors_alone() {
        assert!(matches!(
            StorageError::NotFound.or_conflict("duplicado"),
            StorageError::NotFound
        ));

        let state = StorageError::InvalidState("cerrado".to_string()).or_conflict("duplicado");
        assert!(matches!(state, StorageError::InvalidState(msg) if msg == "cerrado"));
    }
}
