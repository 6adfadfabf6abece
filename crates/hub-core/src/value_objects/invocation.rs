//! Invocation - a named remote call delivered to one or more connections

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A hub invocation: target method name plus ordered arguments
///
/// Arguments are opaque JSON values; encoding them for a particular wire
/// protocol is the transport's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Client-side method to invoke
    pub target: String,
    /// Ordered argument list
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl Invocation {
    /// Create a new invocation
    pub fn new(target: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            target: target.into(),
            arguments,
        }
    }

    /// Create an invocation with no arguments
    pub fn without_arguments(target: impl Into<String>) -> Self {
        Self::new(target, Vec::new())
    }

    /// Number of arguments
    #[inline]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}
