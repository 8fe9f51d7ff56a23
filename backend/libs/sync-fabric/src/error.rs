use thiserror::Error;

/// Connection-level failure; always answered by the supervisor with a
/// reconnect after a fixed delay.
#[derive(Debug, Error)]
pub enum FabricError {
    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("delivery stream for queue '{0}' ended")]
    StreamEnded(String),
}

/// Outcome classification for a failed projection write.
///
/// Integrity violations mean the projection was already applied by an
/// earlier delivery of the same event; everything else is assumed to
/// clear on its own (database restart, connection blip) and earns the
/// message a redelivery.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("projection already applied")]
    AlreadyApplied,

    #[error("transient store failure: {0}")]
    Transient(String),
}

impl From<sqlx::Error> for ProjectionError {
    fn from(err: sqlx::Error) -> Self {
        if is_integrity_violation(&err) {
            ProjectionError::AlreadyApplied
        } else {
            ProjectionError::Transient(err.to_string())
        }
    }
}

/// SQLSTATE class 23 is "integrity constraint violation"; 23505
/// (unique_violation) is the duplicate-key case redeliveries produce.
pub fn is_integrity_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| code.starts_with("23"))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_transient() {
        let err = ProjectionError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ProjectionError::Transient(_)));
    }

    #[test]
    fn row_not_found_is_transient() {
        assert!(!is_integrity_violation(&sqlx::Error::RowNotFound));
    }
}
