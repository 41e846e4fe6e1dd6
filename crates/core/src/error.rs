//! Unified error types for shelter.

use tokio_rusqlite::rusqlite;

/// Unified error types for the shelter engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required prefetch failed during install; the attempt is aborted.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// Transport-level network failure (offline, DNS, timeout, refused).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Cache store operation failed.
    #[error("STORE_ERROR: {0}")]
    Store(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid lifecycle transition.
    #[error("LIFECYCLE_ERROR: {0}")]
    Lifecycle(String),

    /// Request descriptor could not be handled (e.g. unparseable URL).
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Store(tokio_rusqlite::Error::Close(c)),
            _ => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Store(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(tokio_rusqlite::Error::Error(err))
    }
}
