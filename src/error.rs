//! Error types for the search pipeline.

use thiserror::Error;

/// Errors produced while resolving a driver search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was empty or whitespace only. Callers ignore it.
    #[error("no driver name given")]
    EmptyInput,

    #[error("driver not found: {0}")]
    DriverNotFound(String),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Encyclopedia lookup failed. Never aborts a search.
    #[error("biography unavailable for {title}: {reason}")]
    BiographyUnavailable { title: String, reason: String },
}

impl SearchError {
    /// Whether this is a network, HTTP or decoding failure on the
    /// statistics path.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SearchError::Http { .. }
                | SearchError::Status { .. }
                | SearchError::Malformed { .. }
                | SearchError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        let malformed = SearchError::Malformed {
            url: "http://localhost/x.json".to_string(),
            reason: "expected value".to_string(),
        };
        assert!(malformed.is_fetch_error());
        assert!(SearchError::InvalidUrl("nope".to_string()).is_fetch_error());
        assert!(!SearchError::EmptyInput.is_fetch_error());
        assert!(!SearchError::DriverNotFound("x".to_string()).is_fetch_error());
        assert!(!SearchError::BiographyUnavailable {
            title: "Lewis_Hamilton".to_string(),
            reason: "HTTP 404".to_string(),
        }
        .is_fetch_error());
    }

    #[test]
    fn test_messages() {
        let err = SearchError::DriverNotFound("lewis hamilton".to_string());
        assert_eq!(err.to_string(), "driver not found: lewis hamilton");

        let err = SearchError::Status {
            url: "http://localhost/a".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(err.to_string().contains("404"));
    }
}
