//! Schema store error types

use thiserror::Error;

/// Failure to reach, or get a usable response from, the schema store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with a non-success status
    #[error("{endpoint} returned {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response could not be interpreted
    #[error("unexpected response from {endpoint}: {detail}")]
    Malformed { endpoint: String, detail: String },
}

impl StoreError {
    /// Whether the store refused our credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }

    /// Whether the store asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Rejected { status: 429, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let auth = StoreError::Rejected {
            endpoint: "GET /bases/app1/tables".to_string(),
            status: 401,
            body: "AUTHENTICATION_REQUIRED".to_string(),
        };
        assert!(auth.is_auth_failure());
        assert!(!auth.is_rate_limited());

        let throttled = StoreError::Rejected {
            endpoint: "POST /bases".to_string(),
            status: 429,
            body: String::new(),
        };
        assert!(throttled.is_rate_limited());
    }

    #[test]
    fn test_display() {
        let err = StoreError::Malformed {
            endpoint: "POST /bases".to_string(),
            detail: "missing id".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected response from POST /bases: missing id");
    }
}
