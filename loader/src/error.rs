//! Error types for schema document loading.

use thiserror::Error;

/// Errors that can occur while fetching a schema document.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The URI uses a scheme this loader does not serve.
    #[error("unsupported URI scheme '{0}'")]
    UnsupportedScheme(String),

    /// The URI does not map to a local filesystem path.
    #[error("URI does not name a local file: {0}")]
    NotAFilePath(String),

    /// Every loader in a chain declined or failed.
    #[error("no configured loader could serve the URI")]
    NoLoaderMatched,
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
