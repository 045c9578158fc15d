//! # transparent-types
//!
//! Shared value types for the transparent client crates.
//! An `ActionRequest` is built per user action and discarded once its request
//! has been handed to the network layer.

pub mod action;

pub use action::{ActionKind, ActionRequest};

/// Opaque identifier of the module being toggled or voted on.
///
/// Pages render it as the `value` attribute of the triggering element, so it
/// is carried verbatim as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bid(String);

impl Bid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Bid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Bid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Bid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for Bid {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}
