//! Unified error handling for the buglink library
//!
//! The taxonomy separates administrator-time failures (bad URL, bad
//! pattern, bad credentials) from build-time failures (endpoint
//! unreachable). Annotation itself never fails: summary lookup errors
//! degrade to plain links at the call site.

use thiserror::Error;

/// The main error type for the buglink library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuglinkError {
    /// Invalid configuration (malformed base URL, bad ID pattern,
    /// one-sided credentials). Surfaced at configuration time, never
    /// during changelog processing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint unreachable, not a tracker endpoint, or the transport
    /// failed mid-call. Surfaced by the explicit validation checks.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Credentials rejected by the tracker
    #[error("Authentication error: {0}")]
    Auth(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl From<crate::xmlrpc::RpcError> for BuglinkError {
    fn from(err: crate::xmlrpc::RpcError) -> Self {
        BuglinkError::Connection(err.to_string())
    }
}

/// Result type alias for buglink operations
pub type Result<T> = std::result::Result<T, BuglinkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmlrpc::RpcError;

    #[test]
    fn test_rpc_error_maps_to_connection() {
        let err: BuglinkError = RpcError::Fault {
            code: 32000,
            message: "boom".to_string(),
        }
        .into();
        match err {
            BuglinkError::Connection(msg) => {
                assert!(msg.contains("32000"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected Connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = BuglinkError::Config("no host in base URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: no host in base URL");
    }
}
