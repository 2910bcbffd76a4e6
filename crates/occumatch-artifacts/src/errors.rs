//! Artifact error types.
//!
//! Artifact errors are non-fatal to the serving process — a failed load is
//! reported to the triggering request and retried on the next one.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or validating artifact files.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A required artifact file does not exist.
    #[error("Missing required artifact: {}", .0.display())]
    Missing(PathBuf),

    /// `SQLite` error while reading the vector index (preserves source chain).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// CSV error while reading the occupation table (preserves source chain).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact file exists but its contents violate the expected format.
    #[error("Malformed artifact: {0}")]
    Malformed(String),

    /// Vector count and metadata row count disagree.
    #[error("misaligned artifacts: {vectors} index vectors vs {rows} metadata rows")]
    Misaligned {
        /// Vectors stored in the index.
        vectors: usize,
        /// Rows in the occupation table.
        rows: usize,
    },

    /// A query vector's length does not match the index dimensions.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    Dimensions {
        /// Dimensions the index was built with.
        expected: usize,
        /// Dimensions of the offered vector.
        got: usize,
    },
}

/// Result alias for artifact operations.
pub type Result<T> = std::result::Result<T, ArtifactError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_display_variants() {
        let cases = vec![
            (
                ArtifactError::Missing(PathBuf::from("/a/model_name.txt")),
                "Missing required artifact: /a/model_name.txt",
            ),
            (
                ArtifactError::Malformed("truncated blob".into()),
                "Malformed artifact: truncated blob",
            ),
            (
                ArtifactError::Misaligned {
                    vectors: 10,
                    rows: 9,
                },
                "misaligned artifacts: 10 index vectors vs 9 metadata rows",
            ),
            (
                ArtifactError::Dimensions {
                    expected: 384,
                    got: 512,
                },
                "dimension mismatch: expected 384, got 512",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArtifactError>();
    }

    #[test]
    fn error_from_rusqlite() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err: ArtifactError = sqlite_err.into();
        assert!(matches!(err, ArtifactError::Sqlite(_)));
        assert!(err.to_string().contains("SQLite error"));
    }

    #[test]
    fn error_source_chain_preserved() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err: ArtifactError = sqlite_err.into();
        let source = err.source().expect("should have source");
        assert!(source.to_string().contains("Query returned no rows"));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ArtifactError = io_err.into();
        assert!(matches!(err, ArtifactError::Io(_)));
    }

    #[test]
    #[allow(clippy::unnecessary_wraps)]
    fn result_alias_works() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }
        fn returns_err() -> Result<i32> {
            Err(ArtifactError::Malformed("bad".into()))
        }
        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }
}
