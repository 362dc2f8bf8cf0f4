//! MSK Connect connector (DescribeConnector)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaConnectFinder, KafkaConnectWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "MSK Connect Connector";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(20, 20, 10);

define_status!(
    ConnectorState {
        Running => "RUNNING",
        Creating => "CREATING",
        Updating => "UPDATING",
        Deleting => "DELETING",
        Failed => "FAILED",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub arn: String,
    pub name: Option<String>,
    pub state: ConnectorState,
    /// `stateDescription` (code and message)
    pub state_description: Option<FailureReason>,
}

impl Observed for Connector {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ConnectorState::Failed => Some(self.state_description.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

pub fn created_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ConnectorState::Creating])
        .target([ConnectorState::Running])
        .fail_on_unexpected_state(true)
}

pub fn updated_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ConnectorState::Updating])
        .target([ConnectorState::Running])
        .fail_on_unexpected_state(true)
}

pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ConnectorState::Deleting])
        .fail_on_unexpected_state(true)
}

pub fn status_connector(
    finder: Arc<dyn KafkaConnectFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<Connector>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_connector(&arn).await }
    })
}

impl KafkaConnectWaiter {
    pub async fn wait_connector_created(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<Connector, WaitFailure<Connector>> {
        self.poller(created_spec(timeout), KIND, arn, Operation::Create)
            .wait_for_target(status_connector(self.finder(), arn))
            .await
    }

    pub async fn wait_connector_updated(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<Connector, WaitFailure<Connector>> {
        self.poller(updated_spec(timeout), KIND, arn, Operation::Update)
            .wait_for_target(status_connector(self.finder(), arn))
            .await
    }

    pub async fn wait_connector_deleted(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<Connector>> {
        self.poller(deleted_spec(timeout), KIND, arn, Operation::Delete)
            .wait_for_absence(status_connector(self.finder(), arn))
            .await
    }
}
