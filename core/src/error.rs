//! Error types for request validation and dispatch.
//!
//! # Design
//! Validation failures are expected outcomes, not faults: they carry every
//! violated rule so the client can fix all of them in one round-trip.
//! `DispatchError` covers everything that stops a handler from producing
//! its normal response; each variant knows its HTTP status so the
//! dispatcher can convert it without a lookup table.

use std::fmt;

/// Ordered list of human-readable field violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Failures raised while handling a single request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request body was not valid JSON.
    #[error("invalid JSON in request body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The response payload could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    /// The transport could not deliver the full request body.
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl DispatchError {
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::InvalidJson(_) => 400,
            DispatchError::Encode(_) | DispatchError::BodyRead(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_insertion_order() {
        let mut errors = ValidationErrors::new();
        errors.push("first");
        errors.push("second");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages(), ["first", "second"]);
        assert_eq!(errors.to_string(), "first; second");
    }

    #[test]
    fn dispatch_error_statuses() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(DispatchError::InvalidJson(bad_json).status(), 400);
        assert_eq!(DispatchError::BodyRead("reset".to_string()).status(), 500);
    }
}
