//! Correlation types for request tracking
//!
//! Every RPC execution is tagged with a `RequestId` so that the log lines of
//! one batch (payload build, session call, per-filter correlation) can be
//! grouped together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single RPC execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string, e.g. a NETCONF `message-id`
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one RPC execution
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub operation: String,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            operation: operation.into(),
        }
    }
}
