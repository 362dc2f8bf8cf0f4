//! Error types for finders and waits

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::resource::{Operation, ResourceId};

/// Boxed error returned by remote API calls
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structured failure reason reported by a remote resource in a failed state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReason {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl FailureReason {
    pub fn new(code: Option<impl Into<String>>, message: Option<impl Into<String>>) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.map(Into::into),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.message.is_none()
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{}: {}", code, message),
            (Some(code), None) => write!(f, "{}", code),
            (None, Some(message)) => write!(f, "{}", message),
            (None, None) => write!(f, "no failure reason reported"),
        }
    }
}

/// Errors returned by a Finder (a describe/get call against the remote API)
#[derive(Debug, Error)]
pub enum FindError {
    /// The remote API reported that the resource does not exist
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// The call succeeded but returned no resource payload
    #[error("empty result")]
    EmptyResult,

    /// Any other failure (network, throttling, access denied, ...)
    #[error("{0}")]
    Remote(BoxError),
}

impl FindError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn remote(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Remote(Box::new(cause))
    }

    /// Whether this error means "the resource is not there (yet)"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyResult)
    }
}

pub type FindResult<T> = Result<T, FindError>;

/// Why a wait ended without reaching its target
#[derive(Debug, Error)]
pub enum WaitError {
    /// Not-found observations exceeded the allowed budget
    #[error("couldn't find resource ({checks} retries)")]
    NotFoundExhausted { checks: u32 },

    /// A refresh failed with an error other than not-found
    #[error("{0}")]
    Remote(BoxError),

    /// The resource reported a status outside the pending and target sets
    #[error(
        "unexpected state '{state}', wanted target '{}'{}",
        .expected.join(", "),
        reason_suffix(.reason)
    )]
    UnexpectedState {
        state: String,
        expected: Vec<String>,
        reason: Option<FailureReason>,
    },

    /// The deadline elapsed first
    #[error(
        "timeout while waiting for {} (last state: '{}', timeout: {timeout:?})",
        describe_target(.expected),
        describe_state(.last_state)
    )]
    Timeout {
        last_state: String,
        expected: Vec<String>,
        timeout: Duration,
    },

    /// The caller cancelled the wait
    #[error("wait cancelled (last state: '{}')", describe_state(.last_state))]
    Cancelled { last_state: String },

    /// The poll configuration cannot be satisfied
    #[error("invalid poll spec: {0}")]
    InvalidSpec(String),
}

impl WaitError {
    pub fn remote(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Remote(Box::new(cause))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundExhausted { .. })
    }
}

fn reason_suffix(reason: &Option<FailureReason>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!(": {}", reason),
        _ => String::new(),
    }
}

fn describe_target(expected: &[String]) -> String {
    if expected.is_empty() {
        "resource to be gone".to_string()
    } else {
        format!("state to become '{}'", expected.join(", "))
    }
}

fn describe_state(state: &str) -> &str {
    if state.is_empty() { "not found" } else { state }
}

/// A failed wait, with the context the caller needs to report it
///
/// `last_object` holds the most recent object the refresh returned, if any,
/// so callers can inspect it (e.g. to read a failure reason) after a timeout.
pub struct WaitFailure<T> {
    pub resource: ResourceId,
    pub operation: Operation,
    pub error: WaitError,
    pub last_object: Option<T>,
}

impl<T> WaitFailure<T> {
    pub fn new(resource: ResourceId, operation: Operation, error: WaitError) -> Self {
        Self {
            resource,
            operation,
            error,
            last_object: None,
        }
    }

    pub fn with_last_object(mut self, object: Option<T>) -> Self {
        self.last_object = object;
        self
    }

    pub fn map_object<U>(self, f: impl FnOnce(T) -> U) -> WaitFailure<U> {
        WaitFailure {
            resource: self.resource,
            operation: self.operation,
            error: self.error,
            last_object: self.last_object.map(f),
        }
    }

    /// Drop the object and keep only the error
    pub fn into_error(self) -> WaitError {
        self.error
    }
}

impl<T> fmt::Debug for WaitFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitFailure")
            .field("resource", &self.resource)
            .field("operation", &self.operation)
            .field("error", &self.error)
            .field("has_last_object", &self.last_object.is_some())
            .finish()
    }
}

impl<T> fmt::Display for WaitFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "waiting for {} {}: {}",
            self.resource, self.operation, self.error
        )
    }
}

impl<T> std::error::Error for WaitFailure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_reason_display() {
        let reason = FailureReason::new(Some("InternalError"), Some("broker failed to start"));
        assert_eq!(reason.to_string(), "InternalError: broker failed to start");

        let reason = FailureReason::new(None::<String>, Some("quota exceeded"));
        assert_eq!(reason.to_string(), "quota exceeded");
    }

    #[test]
    fn find_error_not_found_classification() {
        assert!(FindError::not_found("cluster").is_not_found());
        assert!(FindError::EmptyResult.is_not_found());
        let remote = FindError::remote(std::io::Error::other("connection reset"));
        assert!(!remote.is_not_found());
    }

    #[test]
    fn unexpected_state_display_includes_reason() {
        let error = WaitError::UnexpectedState {
            state: "FAILED".to_string(),
            expected: vec!["ACTIVE".to_string()],
            reason: Some(FailureReason::new(Some("InternalError"), Some("boom"))),
        };
        assert_eq!(
            error.to_string(),
            "unexpected state 'FAILED', wanted target 'ACTIVE': InternalError: boom"
        );
    }

    #[test]
    fn timeout_display_for_disappearance() {
        let error = WaitError::Timeout {
            last_state: "DELETING".to_string(),
            expected: vec![],
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            error.to_string(),
            "timeout while waiting for resource to be gone (last state: 'DELETING', timeout: 60s)"
        );
    }

    #[test]
    fn wait_failure_maps_last_object() {
        let failure = WaitFailure::new(
            ResourceId::new("MSK Cluster", "arn:cluster"),
            Operation::Create,
            WaitError::Cancelled {
                last_state: "CREATING".to_string(),
            },
        )
        .with_last_object(Some(41_u32));

        let failure = failure.map_object(|n| n + 1);
        assert_eq!(failure.last_object, Some(42));
        assert_eq!(failure.resource, ResourceId::new("MSK Cluster", "arn:cluster"));

        match failure.into_error() {
            WaitError::Cancelled { last_state } => assert_eq!(last_state, "CREATING"),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn wait_failure_map_without_object() {
        let failure: WaitFailure<u32> = WaitFailure::new(
            ResourceId::new("MSK Cluster", "arn:cluster"),
            Operation::Delete,
            WaitError::NotFoundExhausted { checks: 20 },
        );

        let failure = failure.map_object(|n| n.to_string());
        assert_eq!(failure.last_object, None);
        assert!(matches!(
            failure.into_error(),
            WaitError::NotFoundExhausted { checks: 20 }
        ));
    }

    #[test]
    fn wait_failure_display() {
        let failure: WaitFailure<()> = WaitFailure::new(
            ResourceId::new("MSK Configuration", "arn:config"),
            Operation::Delete,
            WaitError::Cancelled {
                last_state: String::new(),
            },
        );
        assert_eq!(
            failure.to_string(),
            "waiting for MSK Configuration (arn:config) delete: wait cancelled (last state: 'not found')"
        );
    }
}
