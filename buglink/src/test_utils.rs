//! Test utilities: a scripted in-memory transport
//!
//! [`FakeTransport`] answers RPC calls from a queue of scripted
//! responses and records every call, so tests can assert on batching
//! and on the one-shot re-login protocol without a network.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::session::Transport;
use crate::xmlrpc::{RpcError, Value};

/// In-memory transport answering from a scripted response queue
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value, RpcError>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeTransport {
    /// A transport with an empty script; any call fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response
    pub fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    /// Script a fault response
    pub fn push_fault(&self, code: i32, message: &str) {
        self.responses.lock().unwrap().push_back(Err(RpcError::Fault {
            code,
            message: message.to_string(),
        }));
    }

    /// Method names of every call issued so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Every call issued so far with its parameters
    pub fn recorded(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls issued so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// A `Bugzilla.version` response reporting `version`
    pub fn version_response(version: &str) -> Value {
        let mut members = BTreeMap::new();
        members.insert("version".to_string(), Value::Str(version.to_string()));
        Value::Struct(members)
    }

    /// A `User.login` response carrying the given user ID
    pub fn login_response(id: i64) -> Value {
        let mut members = BTreeMap::new();
        members.insert("id".to_string(), Value::Int(id));
        Value::Struct(members)
    }

    /// A `Bug.get_bugs` response carrying the given (id, summary) pairs
    pub fn bugs_response(entries: &[(u64, &str)]) -> Value {
        let bugs = entries
            .iter()
            .map(|&(id, summary)| {
                let mut members = BTreeMap::new();
                members.insert("id".to_string(), Value::Int(id as i64));
                members.insert("summary".to_string(), Value::Str(summary.to_string()));
                Value::Struct(members)
            })
            .collect();
        let mut outer = BTreeMap::new();
        outer.insert("bugs".to_string(), Value::Array(bugs));
        Value::Struct(outer)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.to_vec()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(RpcError::Malformed(format!(
                    "no scripted response for '{method}'"
                )))
            })
    }
}
