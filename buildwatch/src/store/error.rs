use thiserror::Error;

/// Errors raised by document store access.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store endpoint could not be reached.
    #[error("Store unreachable: {message}")]
    Connection { message: String },

    /// The store answered a search with a non-success status.
    #[error("Search failed ({status}): {message}")]
    Search { status: u16, message: String },

    /// A request or response body could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The store configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StoreError {
    /// Wraps a transport failure.
    pub(crate) fn connection(err: impl std::fmt::Display) -> Self {
        StoreError::Connection {
            message: err.to_string(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Connection {
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));

        let err = StoreError::Search {
            status: 503,
            message: "no shards available".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("no shards available"));
    }
}
