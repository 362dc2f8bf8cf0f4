//! MSK replicator (DescribeReplicator)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaFinder, KafkaWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "MSK Replicator";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(180, 120, 90);

define_status!(
    ReplicatorState {
        Running => "RUNNING",
        Creating => "CREATING",
        Updating => "UPDATING",
        Deleting => "DELETING",
        Failed => "FAILED",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct Replicator {
    pub arn: String,
    pub name: Option<String>,
    pub state: ReplicatorState,
    pub state_info: Option<FailureReason>,
}

impl Observed for Replicator {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ReplicatorState::Failed => Some(self.state_info.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

pub fn created_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ReplicatorState::Creating])
        .target([ReplicatorState::Running])
        .fail_on_unexpected_state(true)
}

pub fn updated_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ReplicatorState::Updating])
        .target([ReplicatorState::Running])
        .fail_on_unexpected_state(true)
}

/// A replicator may still report RUNNING right after the delete call
pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ReplicatorState::Running, ReplicatorState::Deleting])
        .fail_on_unexpected_state(true)
}

pub fn status_replicator(
    finder: Arc<dyn KafkaFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<Replicator>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_replicator(&arn).await }
    })
}

impl KafkaWaiter {
    pub async fn wait_replicator_created(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<Replicator, WaitFailure<Replicator>> {
        self.poller(created_spec(timeout), KIND, arn, Operation::Create)
            .wait_for_target(status_replicator(self.finder(), arn))
            .await
    }

    pub async fn wait_replicator_updated(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<Replicator, WaitFailure<Replicator>> {
        self.poller(updated_spec(timeout), KIND, arn, Operation::Update)
            .wait_for_target(status_replicator(self.finder(), arn))
            .await
    }

    pub async fn wait_replicator_deleted(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<Replicator>> {
        self.poller(deleted_spec(timeout), KIND, arn, Operation::Delete)
            .wait_for_absence(status_replicator(self.finder(), arn))
            .await
    }
}
