//! XML-RPC wire format for the tracker endpoint
//!
//! Bugzilla's legacy API speaks XML-RPC over HTTP. This module provides
//! a small dynamic [`Value`] model, a request writer and a response
//! parser built on `quick-xml`'s serde support. Faults are decoded into
//! [`RpcError::Fault`] so callers can recognize the "login required"
//! code and drive the one-shot re-login protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fault code Bugzilla returns when a call needs an authenticated session.
pub const LOGIN_REQUIRED: i32 = 410;

/// Errors produced by the RPC layer
#[derive(Debug, Error)]
pub enum RpcError {
    /// The server answered with an XML-RPC fault
    #[error("RPC fault {code}: {message}")]
    Fault {
        /// Numeric fault code from the server
        code: i32,
        /// Human-readable fault string from the server
        message: String,
    },

    /// The HTTP round trip failed (unreachable host, timeout, non-2xx)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload could not be encoded or the response decoded
    #[error("malformed XML-RPC payload: {0}")]
    Malformed(String),
}

/// A dynamically typed XML-RPC value
///
/// Only the types the Bugzilla API actually uses are modeled.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<int>` / `<i4>`
    Int(i64),
    /// `<string>` or bare text content
    Str(String),
    /// `<boolean>`
    Bool(bool),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>`
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Member lookup on a struct value
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(name),
            _ => None,
        }
    }

    /// Borrow the inner string, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The inner integer, if this is an int value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow the inner slice, if this is an array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

// Serde shims mirroring the XML-RPC element structure. The public
// `Value` stays independent of the wire encoding.

#[derive(Debug, Serialize, Deserialize)]
struct ValueXml {
    #[serde(rename = "$value")]
    kind: ValueKind,
}

#[derive(Debug, Serialize, Deserialize)]
enum ValueKind {
    #[serde(rename = "int")]
    Int(i64),
    #[serde(rename = "i4")]
    I4(i64),
    #[serde(rename = "boolean")]
    Boolean(u8),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "array")]
    Array(ArrayXml),
    #[serde(rename = "struct")]
    Struct(StructXml),
    // XML-RPC treats a <value> with no type element as a string
    #[serde(rename = "$text")]
    Text(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct ArrayXml {
    data: ArrayDataXml,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArrayDataXml {
    #[serde(rename = "value", default)]
    values: Vec<ValueXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StructXml {
    #[serde(rename = "member", default)]
    members: Vec<MemberXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MemberXml {
    name: String,
    value: ValueXml,
}

#[derive(Debug, Serialize)]
#[serde(rename = "methodCall")]
struct MethodCallXml<'a> {
    #[serde(rename = "methodName")]
    method_name: &'a str,
    params: CallParamsXml,
}

#[derive(Debug, Serialize)]
struct CallParamsXml {
    param: Vec<ParamXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParamXml {
    value: ValueXml,
}

#[derive(Debug, Deserialize)]
struct MethodResponseXml {
    params: Option<ResponseParamsXml>,
    fault: Option<FaultXml>,
}

#[derive(Debug, Deserialize)]
struct ResponseParamsXml {
    param: ParamXml,
}

#[derive(Debug, Deserialize)]
struct FaultXml {
    value: ValueXml,
}

impl From<&Value> for ValueXml {
    fn from(value: &Value) -> Self {
        let kind = match value {
            Value::Int(i) => ValueKind::Int(*i),
            Value::Str(s) => ValueKind::String(s.clone()),
            Value::Bool(b) => ValueKind::Boolean(u8::from(*b)),
            Value::Array(items) => ValueKind::Array(ArrayXml {
                data: ArrayDataXml {
                    values: items.iter().map(ValueXml::from).collect(),
                },
            }),
            Value::Struct(members) => ValueKind::Struct(StructXml {
                members: members
                    .iter()
                    .map(|(name, value)| MemberXml {
                        name: name.clone(),
                        value: ValueXml::from(value),
                    })
                    .collect(),
            }),
        };
        ValueXml { kind }
    }
}

impl From<ValueXml> for Value {
    fn from(xml: ValueXml) -> Self {
        match xml.kind {
            ValueKind::Int(i) | ValueKind::I4(i) => Value::Int(i),
            ValueKind::Boolean(b) => Value::Bool(b != 0),
            ValueKind::String(s) | ValueKind::Text(s) => Value::Str(s),
            ValueKind::Array(array) => {
                Value::Array(array.data.values.into_iter().map(Value::from).collect())
            }
            ValueKind::Struct(fields) => Value::Struct(
                fields
                    .members
                    .into_iter()
                    .map(|m| (m.name, Value::from(m.value)))
                    .collect(),
            ),
        }
    }
}

/// Encode one method call as an XML-RPC request body
pub fn write_call(method: &str, params: &[Value]) -> Result<String, RpcError> {
    let call = MethodCallXml {
        method_name: method,
        params: CallParamsXml {
            param: params
                .iter()
                .map(|value| ParamXml {
                    value: ValueXml::from(value),
                })
                .collect(),
        },
    };
    let body = quick_xml::se::to_string(&call).map_err(|e| RpcError::Malformed(e.to_string()))?;
    Ok(format!("<?xml version=\"1.0\"?>{body}"))
}

/// Decode an XML-RPC response body into a [`Value`], surfacing faults
pub fn parse_response(xml: &str) -> Result<Value, RpcError> {
    let response: MethodResponseXml =
        quick_xml::de::from_str(xml).map_err(|e| RpcError::Malformed(e.to_string()))?;

    if let Some(fault) = response.fault {
        let fault = Value::from(fault.value);
        let code = fault
            .get("faultCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| RpcError::Malformed("fault without faultCode".to_string()))?;
        let message = fault
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(RpcError::Fault {
            code: code as i32,
            message,
        });
    }

    let params = response
        .params
        .ok_or_else(|| RpcError::Malformed("response carries neither params nor fault".to_string()))?;
    Ok(Value::from(params.param.value))
}
