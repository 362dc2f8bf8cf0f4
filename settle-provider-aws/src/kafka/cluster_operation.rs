//! MSK cluster operation (DescribeClusterOperation)
//!
//! Every cluster update (broker count, storage, configuration, security,
//! version) returns an operation ARN that is awaited here.

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaFinder, KafkaWaiter};
use crate::resources::define_status;

pub const KIND: &str = "MSK Cluster Operation";

pub const COMPLETED: Operation = Operation::Custom("complete");

/// Operations run under the owning cluster's update timeout
pub const TIMEOUT: Duration = super::cluster::TIMEOUTS.update;

define_status!(
    /// State of an asynchronous cluster operation
    ClusterOperationState {
        Pending => "PENDING",
        UpdateInProgress => "UPDATE_IN_PROGRESS",
        UpdateComplete => "UPDATE_COMPLETE",
        UpdateFailed => "UPDATE_FAILED",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOperation {
    pub arn: String,
    pub operation_type: Option<String>,
    pub state: ClusterOperationState,
    /// `errorInfo` (errorCode and errorString)
    pub error_info: Option<FailureReason>,
}

impl Observed for ClusterOperation {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ClusterOperationState::UpdateFailed => Some(self.error_info.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

pub fn completed_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([
            ClusterOperationState::Pending,
            ClusterOperationState::UpdateInProgress,
        ])
        .target([ClusterOperationState::UpdateComplete])
        .fail_on_unexpected_state(true)
}

pub fn status_cluster_operation(
    finder: Arc<dyn KafkaFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<ClusterOperation>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_cluster_operation(&arn).await }
    })
}

impl KafkaWaiter {
    pub async fn wait_cluster_operation_completed(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<ClusterOperation, WaitFailure<ClusterOperation>> {
        self.poller(completed_spec(timeout), KIND, arn, COMPLETED)
            .wait_for_target(status_cluster_operation(self.finder(), arn))
            .await
    }
}
