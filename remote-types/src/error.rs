//! Error types for the relay wire types.

use thiserror::Error;

/// Errors raised while parsing or minting wire values.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Command outside the ARM/DISARM vocabulary
    #[error("invalid command: {0} (must be ARM or DISARM)")]
    InvalidCommand(String),

    /// Usage event outside the known set
    #[error("invalid event type: {0}")]
    InvalidEventKind(String),

    /// OS random number generator failed
    #[error("random generator failed: {0}")]
    Random(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TypesError::InvalidCommand("PANIC".into());
        assert_eq!(err.to_string(), "invalid command: PANIC (must be ARM or DISARM)");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypesError>();
    }
}
