//! MSK cluster (DescribeClusterV2)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaFinder, KafkaWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "MSK Cluster";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(120, 120, 120);

define_status!(
    /// Lifecycle state of an MSK cluster
    ClusterState {
        Active => "ACTIVE",
        Creating => "CREATING",
        Deleting => "DELETING",
        Failed => "FAILED",
        Healing => "HEALING",
        Maintenance => "MAINTENANCE",
        RebootingBroker => "REBOOTING_BROKER",
        Updating => "UPDATING",
    }
);

/// The parts of a cluster description a wait cares about
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub arn: String,
    pub name: Option<String>,
    pub state: ClusterState,
    /// `stateInfo` (code and message), reported while the cluster is failed
    pub state_info: Option<FailureReason>,
}

impl Observed for Cluster {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ClusterState::Failed => Some(self.state_info.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

pub fn created_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ClusterState::Creating])
        .target([ClusterState::Active])
        .fail_on_unexpected_state(true)
}

pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ClusterState::Deleting])
        .fail_on_unexpected_state(true)
}

/// Refresh function reading the cluster state
pub fn status_cluster(
    finder: Arc<dyn KafkaFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<Cluster>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_cluster(&arn).await }
    })
}

impl KafkaWaiter {
    pub async fn wait_cluster_created(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<Cluster, WaitFailure<Cluster>> {
        self.poller(created_spec(timeout), KIND, arn, Operation::Create)
            .wait_for_target(status_cluster(self.finder(), arn))
            .await
    }

    pub async fn wait_cluster_deleted(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<Cluster>> {
        self.poller(deleted_spec(timeout), KIND, arn, Operation::Delete)
            .wait_for_absence(status_cluster(self.finder(), arn))
            .await
    }
}
