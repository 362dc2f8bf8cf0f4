//! MSK VPC connection (DescribeVpcConnection)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaFinder, KafkaWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "MSK VPC Connection";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(30, 30, 30);

define_status!(
    VpcConnectionState {
        Creating => "CREATING",
        Available => "AVAILABLE",
        Inactive => "INACTIVE",
        Deactivating => "DEACTIVATING",
        Deleting => "DELETING",
        Failed => "FAILED",
        Rejected => "REJECTED",
        Rejecting => "REJECTING",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct VpcConnection {
    pub arn: String,
    pub target_cluster_arn: Option<String>,
    pub state: VpcConnectionState,
}

impl Observed for VpcConnection {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            VpcConnectionState::Failed | VpcConnectionState::Rejected => {
                Some(FailureReason::new(Some(self.state.as_str()), None::<String>))
            }
            _ => None,
        }
    }
}

pub fn created_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([VpcConnectionState::Creating])
        .target([VpcConnectionState::Available])
        .fail_on_unexpected_state(true)
}

pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([VpcConnectionState::Deleting, VpcConnectionState::Deactivating])
        .fail_on_unexpected_state(true)
}

pub fn status_vpc_connection(
    finder: Arc<dyn KafkaFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<VpcConnection>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_vpc_connection(&arn).await }
    })
}

impl KafkaWaiter {
    pub async fn wait_vpc_connection_created(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<VpcConnection, WaitFailure<VpcConnection>> {
        self.poller(created_spec(timeout), KIND, arn, Operation::Create)
            .wait_for_target(status_vpc_connection(self.finder(), arn))
            .await
    }

    pub async fn wait_vpc_connection_deleted(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<VpcConnection>> {
        self.poller(deleted_spec(timeout), KIND, arn, Operation::Delete)
            .wait_for_absence(status_vpc_connection(self.finder(), arn))
            .await
    }
}
