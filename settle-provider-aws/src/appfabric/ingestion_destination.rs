//! AppFabric ingestion destination (GetIngestionDestination)

use std::sync::Arc;
use std::time::Duration;

use settle_core::{
    BoxFuture, FailureReason, Observed, Operation, PollSpec, RefreshResult, WaitFailure,
    status_refresh,
};

use super::{AppFabricFinder, AppFabricWaiter};
use crate::resources::{Timeouts, define_status};

pub const KIND: &str = "AppFabric Ingestion Destination";

pub const TIMEOUTS: Timeouts = Timeouts::minutes(5, 5, 5);

define_status!(
    IngestionDestinationStatus {
        Active => "Active",
        Failed => "Failed",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionDestination {
    pub arn: String,
    pub ingestion_arn: String,
    pub status: IngestionDestinationStatus,
    pub status_reason: Option<String>,
}

impl Observed for IngestionDestination {
    fn status(&self) -> &str {
        self.status.as_str()
    }

    fn failure(&self) -> Option<FailureReason> {
        match self.status {
            IngestionDestinationStatus::Failed => Some(FailureReason::new(
                None::<String>,
                self.status_reason.clone(),
            )),
            _ => None,
        }
    }
}

/// Active must be observed on two consecutive polls
pub fn created_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 2)
        .target([IngestionDestinationStatus::Active])
        .fail_on_unexpected_state(true)
}

pub fn updated_spec(timeout: Duration) -> PollSpec {
    created_spec(timeout)
}

pub fn deleted_spec(timeout: Duration) -> PollSpec {
    PollSpec::new(timeout, 20, 1)
        .pending([
            IngestionDestinationStatus::Active,
            IngestionDestinationStatus::Failed,
        ])
        .fail_on_unexpected_state(true)
}

pub fn status_ingestion_destination(
    finder: Arc<dyn AppFabricFinder>,
    app_bundle: &str,
    ingestion: &str,
    destination: &str,
) -> impl FnMut() -> BoxFuture<'static, RefreshResult<IngestionDestination>> {
    let app_bundle = app_bundle.to_string();
    let ingestion = ingestion.to_string();
    let destination = destination.to_string();
    status_refresh(move || {
        let finder = Arc::clone(&finder);
        let app_bundle = app_bundle.clone();
        let ingestion = ingestion.clone();
        let destination = destination.clone();
        async move {
            finder
                .find_ingestion_destination(&app_bundle, &ingestion, &destination)
                .await
        }
    })
}

impl AppFabricWaiter {
    pub async fn wait_ingestion_destination_created(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
        timeout: Duration,
    ) -> Result<IngestionDestination, WaitFailure<IngestionDestination>> {
        self.poller(
            created_spec(timeout),
            KIND,
            &[app_bundle, ingestion, destination],
            Operation::Create,
        )
        .wait_for_target(status_ingestion_destination(
            self.finder(),
            app_bundle,
            ingestion,
            destination,
        ))
        .await
    }

    pub async fn wait_ingestion_destination_updated(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
        timeout: Duration,
    ) -> Result<IngestionDestination, WaitFailure<IngestionDestination>> {
        self.poller(
            updated_spec(timeout),
            KIND,
            &[app_bundle, ingestion, destination],
            Operation::Update,
        )
        .wait_for_target(status_ingestion_destination(
            self.finder(),
            app_bundle,
            ingestion,
            destination,
        ))
        .await
    }

    pub async fn wait_ingestion_destination_deleted(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
        timeout: Duration,
    ) -> Result<(), WaitFailure<IngestionDestination>> {
        self.poller(
            deleted_spec(timeout),
            KIND,
            &[app_bundle, ingestion, destination],
            Operation::Delete,
        )
        .wait_for_absence(status_ingestion_destination(
            self.finder(),
            app_bundle,
            ingestion,
            destination,
        ))
        .await
    }
}
