//! AWS AppFabric waiters
//!
//! AppFabric resources live inside an app bundle, so every lookup takes the
//! bundle identifier plus the resource's own identifiers.

pub mod app_authorization;
pub mod client;
pub mod ingestion_destination;

use std::sync::Arc;

use async_trait::async_trait;
use settle_core::{CancellationToken, FindResult, Operation, PollSpec, Poller, ResourceId};

pub use app_authorization::{AppAuthorization, AppAuthorizationStatus};
pub use client::AppFabricClient;
pub use ingestion_destination::{IngestionDestination, IngestionDestinationStatus};

/// Get calls against the AppFabric API
#[async_trait]
pub trait AppFabricFinder: Send + Sync {
    async fn find_app_authorization(
        &self,
        app_bundle: &str,
        authorization: &str,
    ) -> FindResult<AppAuthorization>;

    async fn find_ingestion_destination(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
    ) -> FindResult<IngestionDestination>;
}

/// Waits on AppFabric resources
#[derive(Clone)]
pub struct AppFabricWaiter {
    finder: Arc<dyn AppFabricFinder>,
    cancel: CancellationToken,
}

impl AppFabricWaiter {
    pub fn new(finder: Arc<dyn AppFabricFinder>) -> Self {
        Self {
            finder,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn finder(&self) -> Arc<dyn AppFabricFinder> {
        Arc::clone(&self.finder)
    }

    fn poller(&self, spec: PollSpec, kind: &str, parts: &[&str], operation: Operation) -> Poller {
        Poller::new(spec, ResourceId::new(kind, parts.join(",")), operation)
            .with_cancellation(self.cancel.clone())
    }
}
