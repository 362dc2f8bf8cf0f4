//! AppFabric app authorization (GetAppAuthorization)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{AppFabricFinder, AppFabricWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "AppFabric App Authorization";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(30, 30, 30);

define_status!(
    AppAuthorizationStatus {
        PendingConnect => "PendingConnect",
        Connected => "Connected",
        ConnectionValidationFailed => "ConnectionValidationFailed",
        TokenAutoRotationFailed => "TokenAutoRotationFailed",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct AppAuthorization {
    pub arn: String,
    pub app_bundle_arn: String,
    pub app: Option<String>,
    pub status: AppAuthorizationStatus,
}

impl Observed for AppAuthorization {
    fn status(&self) -> &str {
        self.status.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.status {
            AppAuthorizationStatus::ConnectionValidationFailed
            | AppAuthorizationStatus::TokenAutoRotationFailed => {
                Some(FailureReason::new(Some(self.status.as_str()), None::<String>))
            }
            _ => None,
        }
    }
}

// An authorization is usable as soon as it exists; PendingConnect only means
// the OAuth handshake has not been completed yet.
fn settled_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .target([
            AppAuthorizationStatus::PendingConnect,
            AppAuthorizationStatus::Connected,
        ])
        .fail_on_unexpected_state(true)
}

pub fn created_spec(timeout: Duration) -> PollSpec {
    settled_spec(timeout)
}

pub fn updated_spec(timeout: Duration) -> PollSpec {
    settled_spec(timeout)
}

pub fn status_app_authorization(
    finder: Arc<dyn AppFabricFinder>,
    app_bundle: &str,
    authorization: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<AppAuthorization>> {
    let app_bundle = app_bundle.to_string();
    let authorization = authorization.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let app_bundle = app_bundle.clone();
        let authorization = authorization.clone();
        async move {
            finder
                .find_app_authorization(&app_bundle, &authorization)
                .await
        }
    })
}

impl AppFabricWaiter {
    pub async fn wait_app_authorization_created(
        &self,
        app_bundle: &str,
        authorization: &str,
        timeout: Duration,
    ) -> Result<AppAuthorization, WaitFailure<AppAuthorization>> {
        self.poller(
            created_spec(timeout),
            KIND,
            &[app_bundle, authorization],
            Operation::Create,
        )
        .wait_for_target(status_app_authorization(self.finder(), app_bundle, authorization))
        .await
    }

    pub async fn wait_app_authorization_updated(
        &self,
        app_bundle: &str,
        authorization: &str,
        timeout: Duration,
    ) -> Result<AppAuthorization, WaitFailure<AppAuthorization>> {
        self.poller(
            updated_spec(timeout),
            KIND,
            &[app_bundle, authorization],
            Operation::Update,
        )
        .wait_for_target(status_app_authorization(self.finder(), app_bundle, authorization))
        .await
    }
}
