//! Failure values carried by `failed` status signals
//!
//! Assertion failures, explicit failures and timeouts all travel as a
//! [`TestError`] in the `error` field of a signal.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// The fixed set of assertion operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    Ok,
    Equal,
    NotEqual,
    DeepEqual,
    NotDeepEqual,
    Throws,
    DoesNotThrow,
    IfError,
    Fail,
}

impl Assertion {
    pub fn name(&self) -> &'static str {
        match self {
            Assertion::Ok => "ok",
            Assertion::Equal => "equal",
            Assertion::NotEqual => "not_equal",
            Assertion::DeepEqual => "deep_equal",
            Assertion::NotDeepEqual => "not_deep_equal",
            Assertion::Throws => "throws",
            Assertion::DoesNotThrow => "does_not_throw",
            Assertion::IfError => "if_error",
            Assertion::Fail => "fail",
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed assertion
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{operator}: {message}")]
pub struct AssertionError {
    pub operator: Assertion,
    pub message: String,
}

impl AssertionError {
    pub fn new(operator: Assertion, message: impl Into<String>) -> Self {
        Self {
            operator,
            message: message.into(),
        }
    }
}

/// Why a test failed
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TestError {
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionError),

    #[error("{0}")]
    Explicit(String),

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("panicked: {0}")]
    Panic(String),
}

impl TestError {
    /// Build an explicit failure from any displayable value
    pub fn explicit(reason: impl fmt::Display) -> Self {
        TestError::Explicit(reason.to_string())
    }

    /// Convert a payload caught by `catch_unwind`
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TestError::Panic(message)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TestError::Timeout { .. })
    }
}

impl From<String> for TestError {
    fn from(reason: String) -> Self {
        TestError::Explicit(reason)
    }
}

impl From<&str> for TestError {
    fn from(reason: &str) -> Self {
        TestError::Explicit(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_error_display() {
        let err = AssertionError::new(Assertion::Equal, "1 != 2");
        assert_eq!(err.to_string(), "equal: 1 != 2");

        let err: TestError = err.into();
        assert_eq!(err.to_string(), "assertion failed: equal: 1 != 2");
    }

    #[test]
    fn test_explicit_conversions() {
        assert_eq!(TestError::from("Foobar"), TestError::Explicit("Foobar".into()));
        assert_eq!(
            TestError::explicit(42),
            TestError::Explicit("42".to_string())
        );
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(
            TestError::from_panic(err),
            TestError::Panic("static message".to_string())
        );

        let err = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(
            TestError::from_panic(err),
            TestError::Panic("formatted 7".to_string())
        );
    }

    #[test]
    fn test_timeout_serialization() {
        let err = TestError::Timeout { after_ms: 20 };
        assert!(err.is_timeout());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["detail"]["after_ms"], 20);
    }
}
