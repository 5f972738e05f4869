//! Administrative validation checks
//!
//! These map one-to-one onto the settings an administrator types in:
//! is the ID pattern compilable, is the base URL a reachable tracker
//! endpoint, do the credentials authenticate. None of them run on the
//! annotation hot path, and each failure carries its own message.

use crate::config::TrackerConfig;
use crate::error::{BuglinkError, Result};
use crate::pattern::compile_pattern;
use crate::session::Session;

/// Check that a bug-ID pattern is usable
pub fn pattern(value: &str) -> Result<()> {
    compile_pattern(value).map(|_| ())
}

/// Check that the base URL points at a live tracker endpoint.
///
/// Returns the server version on success.
pub async fn endpoint(base_url: &str) -> Result<String> {
    let config = TrackerConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    let session = Session::new(&config)?;
    session.check_version().await
}

/// Check that the credentials authenticate against the tracker
pub async fn credentials(base_url: &str, username: &str, password: &str) -> Result<()> {
    let config = TrackerConfig {
        base_url: base_url.to_string(),
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        ..Default::default()
    };
    let session = Session::new(&config)?;
    // confirm the endpoint answers before judging the credentials
    session.check_version().await?;
    if session.login().await {
        Ok(())
    } else {
        Err(BuglinkError::Auth("invalid username/password".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_check_accepts_default() {
        assert!(pattern(r"\b[0-9.]*[0-9]\b").is_ok());
    }

    #[test]
    fn test_pattern_check_rejects_empty_and_broken() {
        assert!(pattern("").is_err());
        assert!(pattern("(").is_err());
    }

    #[tokio::test]
    async fn test_endpoint_check_rejects_malformed_url() {
        let err = endpoint("not a url at all").await.unwrap_err();
        assert!(matches!(err, BuglinkError::Config(_)));
    }

    #[tokio::test]
    async fn test_credentials_check_rejects_malformed_url() {
        let err = credentials("::::", "qa", "pw").await.unwrap_err();
        assert!(matches!(err, BuglinkError::Config(_)));
    }
}
