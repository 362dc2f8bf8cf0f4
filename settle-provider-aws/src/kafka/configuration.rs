//! MSK configuration (DescribeConfiguration)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{KafkaFinder, KafkaWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "MSK Configuration";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(5, 5, 5);

define_status!(
    ConfigurationState {
        Active => "ACTIVE",
        Deleting => "DELETING",
        DeleteFailed => "DELETE_FAILED",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub arn: String,
    pub name: Option<String>,
    pub state: ConfigurationState,
}

impl Observed for Configuration {
    fn status(&self) -> &str {
        self.state.as_str()
    }

    // DescribeConfiguration has no reason field; the state itself is the reason
    fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ConfigurationState::DeleteFailed => Some(FailureReason::new(
                Some(ConfigurationState::DeleteFailed.as_str()),
                None::<String>,
            )),
            _ => None,
        }
    }
}

pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([ConfigurationState::Deleting])
        .fail_on_unexpected_state(true)
}

pub fn status_configuration(
    finder: Arc<dyn KafkaFinder>,
    arn: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<Configuration>> {
    let arn = arn.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let arn = arn.clone();
        async move { finder.find_configuration(&arn).await }
    })
}

impl KafkaWaiter {
    pub async fn wait_configuration_deleted(
        &self,
        arn: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<Configuration>> {
        self.poller(deleted_spec(timeout), KIND, arn, Operation::Delete)
            .wait_for_absence(status_configuration(self.finder(), arn))
            .await
    }
}
