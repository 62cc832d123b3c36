//! Common error types used throughout vidstream.
//!
//! Every failure a request can hit funnels into [`Error`], which carries enough
//! context for the HTTP layer to pick a status code via [`Error::http_status`].
//! None of these errors imply a partially mutated state; they are terminal for
//! the request that produced them.

/// Common error type for vidstream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The identifier did not resolve in the catalog or the blob store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The `Range` header could not be parsed.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// The range is well formed but lies outside the resource.
    #[error("Range not satisfiable for resource of {total_length} bytes")]
    RangeNotSatisfiable {
        /// Total length of the resource, disclosed so clients can retry.
        total_length: u64,
    },

    /// Storage returned fewer bytes than the resolved range requires.
    #[error("Incomplete read: expected {expected} bytes, got {actual}")]
    IncompleteRead {
        /// Bytes the range asked for.
        expected: u64,
        /// Bytes actually available.
        actual: u64,
    },

    /// The uploaded content type is not on the allow-list.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::InvalidInput(_) => 400,
            Error::InvalidRange(_) => 400,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::IncompleteRead { .. } => 500,
            Error::UnsupportedMediaType(_) => 415,
            Error::Database(_) => 500,
            Error::Io(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidRange(_) => "invalid_range",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::IncompleteRead { .. } => "incomplete_read",
            Error::UnsupportedMediaType(_) => "unsupported_media_type",
            Error::Database(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new InvalidRange error.
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a new RangeNotSatisfiable error.
    pub fn range_not_satisfiable(total_length: u64) -> Self {
        Self::RangeNotSatisfiable { total_length }
    }

    /// Create a new UnsupportedMediaType error.
    pub fn unsupported_media_type<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
