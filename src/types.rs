//! Common types used throughout resource-dispatch
//!
//! This module contains shared type definitions, type aliases,
//! and the operation/verb vocabulary of the engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// One of the five abstract operations the engine dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    Create,
    Update,
    Destroy,
    List,
}

impl Operation {
    /// Operations addressing exactly one resource by identifier
    pub fn is_single_object(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Destroy)
    }

    /// Operations sending a request body
    pub fn has_body(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }

    /// HTTP verb used for this operation
    pub fn method(self) -> Method {
        match self {
            Self::Get | Self::List => Method::GET,
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::Destroy => Method::DELETE,
        }
    }

    /// Lowercase operation name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "destroy" | "delete" => Ok(Self::Destroy),
            "list" => Ok(Self::List),
            _ => Err(Error::OperationNotSupported {
                operation: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Operation::Get, Method::GET, true, false)]
    #[test_case(Operation::List, Method::GET, false, false)]
    #[test_case(Operation::Create, Method::POST, false, true)]
    #[test_case(Operation::Update, Method::PUT, true, true)]
    #[test_case(Operation::Destroy, Method::DELETE, true, false)]
    fn test_operation_mapping(op: Operation, method: Method, single: bool, body: bool) {
        assert_eq!(op.method(), method);
        assert_eq!(op.is_single_object(), single);
        assert_eq!(op.has_body(), body);
    }

    #[test]
    fn test_operation_from_str() {
        assert_eq!("GET".parse::<Operation>().unwrap(), Operation::Get);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Destroy);

        let err = "patch".parse::<Operation>().unwrap_err();
        assert!(matches!(err, Error::OperationNotSupported { .. }));
    }

    #[test]
    fn test_method_into_reqwest() {
        assert_eq!(reqwest::Method::from(Method::PUT), reqwest::Method::PUT);
        assert_eq!(Method::DELETE.to_string(), "DELETE");
    }
}
