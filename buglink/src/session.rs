//! Tracker client: version check, login and batched bug-summary lookup
//!
//! [`Session`] owns access to the Bugzilla XML-RPC endpoint. Every RPC
//! goes through the one-shot re-login protocol: a call failing with the
//! "login required" fault triggers exactly one [`Session::login`] and
//! one retry; anything else, or a second failure, propagates. The
//! transport is created lazily and is stateless between calls apart
//! from its own cookie jar, so racing initializers may both succeed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use url::Url;

use crate::config::TrackerConfig;
use crate::error::{BuglinkError, Result};
use crate::xmlrpc::{self, RpcError, Value, LOGIN_REQUIRED};

/// One XML-RPC round trip. The seam lets tests script the remote side.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one method call and decode the response
    async fn call(&self, method: &str, params: &[Value]) -> std::result::Result<Value, RpcError>;
}

/// HTTP transport for a real Bugzilla endpoint
///
/// The reqwest client is built on first use with a cookie store so the
/// session cookie from a login survives into subsequent calls.
pub struct HttpTransport {
    endpoint: Url,
    client: OnceLock<reqwest::Client>,
}

impl HttpTransport {
    /// Point the transport at `{base_url}/xmlrpc.cgi`.
    ///
    /// A base URL that does not parse or has no host is a
    /// configuration error, distinct from runtime connection failures.
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{trimmed}/xmlrpc.cgi"))
            .map_err(|e| BuglinkError::Config(format!("not a valid URL '{base_url}': {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(BuglinkError::Config(format!(
                "base URL '{base_url}' has no host"
            )));
        }
        Ok(Self {
            endpoint,
            client: OnceLock::new(),
        })
    }

    // Lazy single-slot client cache. If two callers race, both builds
    // succeed and converge on the slot's winner.
    fn client(&self) -> std::result::Result<reqwest::Client, RpcError> {
        if let Some(client) = self.client.get() {
            return Ok(client.clone());
        }
        let built = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(self.client.get_or_init(|| built).clone())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: &str, params: &[Value]) -> std::result::Result<Value, RpcError> {
        let body = xmlrpc::write_call(method, params)?;
        tracing::trace!(method, endpoint = %self.endpoint, "issuing XML-RPC call");
        let response = self
            .client()?
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        xmlrpc::parse_response(&text)
    }
}

/// A connection to the tracker's XML-RPC endpoint
pub struct Session {
    transport: Arc<dyn Transport>,
    username: Option<String>,
    password: Option<String>,
}

impl Session {
    /// Build a session from configuration.
    ///
    /// Fails with a configuration error for a malformed base URL or
    /// one-sided credentials. No network traffic happens here.
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        if config.username.is_some() != config.password.is_some() {
            return Err(BuglinkError::Config(
                "username and password must be configured together".to_string(),
            ));
        }
        let transport = HttpTransport::new(&config.base_url)?;
        Ok(Self {
            transport: Arc::new(transport),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build a session over an explicit transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            transport,
            username,
            password,
        }
    }

    /// Query the server version, confirming this is a tracker endpoint.
    ///
    /// Used for configuration validation, not on the annotation path.
    pub async fn check_version(&self) -> Result<String> {
        let result = self.execute("Bugzilla.version", &[]).await?;
        let version = result
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BuglinkError::Connection(
                    "endpoint did not report a Bugzilla version".to_string(),
                )
            })?
            .to_string();
        tracing::info!("Bugzilla server version is {version}");
        Ok(version)
    }

    /// Log in with the configured credentials.
    ///
    /// Returns `true` without a network call when no credentials are
    /// configured (anonymous mode). Rejected credentials and transport
    /// problems both come back as `false`; login failure is an
    /// expected answer here, not an error.
    pub async fn login(&self) -> bool {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            tracing::debug!("username or password missing, assuming login not necessary");
            return true;
        };

        let mut args = BTreeMap::new();
        args.insert("login".to_string(), Value::Str(username.clone()));
        args.insert("password".to_string(), Value::Str(password.clone()));
        match self.transport.call("User.login", &[Value::Struct(args)]).await {
            Ok(result) => match result.get("id").and_then(Value::as_i64) {
                Some(id) => {
                    tracing::debug!(user_id = id, "tracker login succeeded");
                    true
                }
                None => {
                    tracing::warn!("no 'id' in tracker login response");
                    false
                }
            },
            Err(e) => {
                tracing::warn!("cannot log in to tracker: {e}");
                false
            }
        }
    }

    /// Resolve many bug IDs to one-line summaries in a single round trip.
    ///
    /// `None` for an empty ID set (no network call) and on any RPC
    /// failure: callers degrade to plain links rather than aborting the
    /// annotation pass. A returned map lacking an ID means the server
    /// does not know that bug.
    pub async fn bug_summaries(&self, ids: &BTreeSet<u64>) -> Option<HashMap<u64, String>> {
        if ids.is_empty() {
            return None;
        }

        let arg_ids: Vec<Value> = ids
            .iter()
            .filter_map(|&id| i64::try_from(id).ok().map(Value::Int))
            .collect();
        let mut params = BTreeMap::new();
        params.insert("ids".to_string(), Value::Array(arg_ids));

        let result = match self.execute("Bug.get_bugs", &[Value::Struct(params)]).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("problem getting bug summaries: {e}");
                return None;
            }
        };
        let Some(bugs) = result.get("bugs").and_then(Value::as_array) else {
            tracing::warn!("bug fetch response carries no 'bugs' member");
            return None;
        };
        tracing::debug!("bug fetch returned {} entries", bugs.len());

        let mut summaries = HashMap::new();
        for bug in bugs {
            let id = bug
                .get("id")
                .and_then(Value::as_i64)
                .and_then(|i| u64::try_from(i).ok());
            let summary = bug.get("summary").and_then(Value::as_str);
            match (id, summary) {
                (Some(id), Some(summary)) => {
                    summaries.insert(id, summary.to_string());
                }
                _ => tracing::debug!("skipping malformed bug entry in fetch response"),
            }
        }
        Some(summaries)
    }

    // Issue one RPC under the one-shot re-login protocol.
    async fn execute(&self, method: &str, params: &[Value]) -> std::result::Result<Value, RpcError> {
        let mut retried = false;
        loop {
            match self.transport.call(method, params).await {
                Ok(value) => return Ok(value),
                Err(RpcError::Fault {
                    code: LOGIN_REQUIRED,
                    message,
                }) if !retried => {
                    tracing::debug!(method, "login required ({message}), attempting");
                    retried = true;
                    if !self.login().await {
                        tracing::debug!(method, "re-login failed, retrying call anyway");
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeTransport;

    fn anonymous(transport: Arc<FakeTransport>) -> Session {
        Session::with_transport(transport, None, None)
    }

    fn authenticated(transport: Arc<FakeTransport>) -> Session {
        Session::with_transport(
            transport,
            Some("qa@example.com".to_string()),
            Some("hunter2".to_string()),
        )
    }

    #[test]
    fn test_new_rejects_relative_url() {
        let config = TrackerConfig {
            base_url: "bugzilla.example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Session::new(&config),
            Err(BuglinkError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_one_sided_credentials() {
        let config = TrackerConfig {
            username: Some("qa@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Session::new(&config),
            Err(BuglinkError::Config(_))
        ));
    }

    #[test]
    fn test_new_accepts_valid_config() {
        assert!(Session::new(&TrackerConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_login_anonymous_mode_makes_no_call() {
        let transport = Arc::new(FakeTransport::new());
        let session = anonymous(transport.clone());
        assert!(session.login().await);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_login_success() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(FakeTransport::login_response(42));
        let session = authenticated(transport.clone());
        assert!(session.login().await);
        assert_eq!(transport.methods(), vec!["User.login"]);
    }

    #[tokio::test]
    async fn test_login_without_id_is_rejected() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(Value::Struct(Default::default()));
        let session = authenticated(transport.clone());
        assert!(!session.login().await);
    }

    #[tokio::test]
    async fn test_login_fault_returns_false() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(300, "invalid username or password");
        let session = authenticated(transport.clone());
        assert!(!session.login().await);
    }

    #[tokio::test]
    async fn test_check_version() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(FakeTransport::version_response("5.0.4"));
        let session = anonymous(transport.clone());
        assert_eq!(session.check_version().await.unwrap(), "5.0.4");
        assert_eq!(transport.methods(), vec!["Bugzilla.version"]);
    }

    #[tokio::test]
    async fn test_check_version_on_non_tracker_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(Value::Str("<html>not bugzilla</html>".to_string()));
        let session = anonymous(transport.clone());
        assert!(matches!(
            session.check_version().await,
            Err(BuglinkError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_login_required_triggers_one_relogin_and_retry() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(LOGIN_REQUIRED, "Login required");
        transport.push_ok(FakeTransport::login_response(7));
        transport.push_ok(FakeTransport::version_response("5.0.4"));
        let session = authenticated(transport.clone());

        assert_eq!(session.check_version().await.unwrap(), "5.0.4");
        assert_eq!(
            transport.methods(),
            vec!["Bugzilla.version", "User.login", "Bugzilla.version"]
        );
    }

    #[tokio::test]
    async fn test_login_required_retry_skips_login_call_when_anonymous() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(LOGIN_REQUIRED, "Login required");
        transport.push_ok(FakeTransport::version_response("5.0.4"));
        let session = anonymous(transport.clone());

        assert_eq!(session.check_version().await.unwrap(), "5.0.4");
        assert_eq!(
            transport.methods(),
            vec!["Bugzilla.version", "Bugzilla.version"]
        );
    }

    #[tokio::test]
    async fn test_second_login_required_propagates() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(LOGIN_REQUIRED, "Login required");
        transport.push_ok(FakeTransport::login_response(7));
        transport.push_fault(LOGIN_REQUIRED, "Login required");
        let session = authenticated(transport.clone());

        assert!(session.check_version().await.is_err());
        // exactly one retry: original call, login, retried call
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_other_fault_is_not_retried() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(32000, "internal error");
        let session = authenticated(transport.clone());
        assert!(session.check_version().await.is_err());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bug_summaries_empty_set_makes_no_call() {
        let transport = Arc::new(FakeTransport::new());
        let session = anonymous(transport.clone());
        assert!(session.bug_summaries(&BTreeSet::new()).await.is_none());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bug_summaries_batches_into_one_call() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(FakeTransport::bugs_response(&[
            (1, "first"),
            (2, "second"),
            (3, "third"),
        ]));
        let session = anonymous(transport.clone());

        let ids: BTreeSet<u64> = [1, 2, 3].into_iter().collect();
        let summaries = session.bug_summaries(&ids).await.unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries.get(&2).map(String::as_str), Some("second"));

        // the single call carried all three IDs
        let (method, params) = transport.recorded().pop().unwrap();
        assert_eq!(method, "Bug.get_bugs");
        let sent = params[0].get("ids").and_then(Value::as_array).unwrap().len();
        assert_eq!(sent, 3);
    }

    #[tokio::test]
    async fn test_bug_summaries_fail_open() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_fault(32000, "database down");
        let session = anonymous(transport.clone());
        let ids: BTreeSet<u64> = [1].into_iter().collect();
        assert!(session.bug_summaries(&ids).await.is_none());
    }

    #[tokio::test]
    async fn test_bug_summaries_skips_malformed_entries() {
        let transport = Arc::new(FakeTransport::new());
        let mut good = BTreeMap::new();
        good.insert("id".to_string(), Value::Int(5));
        good.insert("summary".to_string(), Value::Str("ok".to_string()));
        let mut broken = BTreeMap::new();
        broken.insert("id".to_string(), Value::Str("not a number".to_string()));
        let mut outer = BTreeMap::new();
        outer.insert(
            "bugs".to_string(),
            Value::Array(vec![Value::Struct(good), Value::Struct(broken)]),
        );
        transport.push_ok(Value::Struct(outer));

        let session = anonymous(transport.clone());
        let ids: BTreeSet<u64> = [5].into_iter().collect();
        let summaries = session.bug_summaries(&ids).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries.get(&5).map(String::as_str), Some("ok"));
    }
}
