//! Settle Core
//!
//! Generic "poll until condition" engine for asynchronous cloud operations.
//!
//! ## Module Structure
//!
//! - `spec` - PollSpec and Backoff: what to wait for and how often to look
//! - `refresh` - One status check, and the adapter from finders to checks
//! - `poller` - The polling state machine
//! - `error` - Finder and wait error taxonomy
//! - `resource` - Resource and operation labels used in error context

pub mod error;
pub mod poller;
pub mod refresh;
pub mod resource;
pub mod spec;

// Re-export main types
pub use error::{BoxError, FailureReason, FindError, FindResult, WaitError, WaitFailure};
pub use poller::{Poller, Settled};
pub use refresh::{BoxFuture, Observed, Refresh, RefreshResult, observe, status_refresh};
pub use resource::{Operation, ResourceId};
pub use spec::{Backoff, PollSpec};
pub use tokio_util::sync::CancellationToken;
