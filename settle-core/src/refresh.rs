//! Refresh - One status check and the adapter from finders to checks

use std::future::Future;
use std::pin::Pin;

use crate::error::{FailureReason, FindError, FindResult, WaitError};

/// Return type for boxed async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of one status check
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh<T> {
    /// The resource exists and reports `status`
    Found { object: T, status: String },
    /// The resource exists but is in a known failure status
    Failed {
        object: T,
        status: String,
        reason: FailureReason,
    },
    /// The resource does not exist (yet, or any more)
    NotFound,
}

impl<T> Refresh<T> {
    pub fn found(object: T, status: impl Into<String>) -> Self {
        Self::Found {
            object,
            status: status.into(),
        }
    }

    /// Status string of this observation; empty for not-found
    pub fn status(&self) -> &str {
        match self {
            Self::Found { status, .. } | Self::Failed { status, .. } => status,
            Self::NotFound => "",
        }
    }
}

pub type RefreshResult<T> = Result<Refresh<T>, WaitError>;

/// A remote object that reports a status
pub trait Observed {
    /// Wire representation of the current status
    fn status(&self) -> &str;

    /// Reason the object is in a failure status, `None` while it is healthy
    fn failure(&self) -> Option<FailureReason> {
        None
    }
}

/// Map a finder result onto a status check
///
/// Not-found is downgraded to [`Refresh::NotFound`] so the poller can decide
/// whether it is expected. Any other finder error is a hard failure.
pub fn observe<T: Observed>(result: FindResult<T>) -> RefreshResult<T> {
    match result {
        Ok(object) => {
            let status = object.status().to_string();
            match object.failure() {
                Some(reason) => Ok(Refresh::Failed {
                    object,
                    status,
                    reason,
                }),
                None => Ok(Refresh::Found { object, status }),
            }
        }
        Err(FindError::NotFound { .. } | FindError::EmptyResult) => Ok(Refresh::NotFound),
        Err(FindError::Remote(cause)) => Err(WaitError::Remote(cause)),
    }
}

/// Build a refresh function from a finder call
///
/// `find` is invoked once per poll; each call must produce an independent
/// future, typically by cloning a shared client and the resource key into it.
pub fn status_refresh<T, F, Fut>(find: F) -> impl FnMut() -> BoxFuture<'static, RefreshResult<T>>
where
    T: Observed + Send + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = FindResult<T>> + Send + 'static,
{
    move || {
        let pending = find();
        Box::pin(async move { observe(pending.await) })
    }
}
