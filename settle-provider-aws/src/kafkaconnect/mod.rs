//! Amazon MSK Connect waiters

pub mod client;
pub mod connector;

use std::sync::Arc;

use async_trait::async_trait;
use settle_core::{CancellationToken, FindResult, Operation, PollSpec, Poller, ResourceId};

pub use client::KafkaConnectClient;
pub use connector::{Connector, ConnectorState};

/// Describe calls against the MSK Connect API
#[async_trait]
pub trait KafkaConnectFinder: Send + Sync {
    async fn find_connector(&self, arn: &str) -> FindResult<Connector>;
}

/// Waits on MSK Connect resources
#[derive(Clone)]
pub struct KafkaConnectWaiter {
    finder: Arc<dyn KafkaConnectFinder>,
    cancel: CancellationToken,
}

impl KafkaConnectWaiter {
    pub fn new(finder: Arc<dyn KafkaConnectFinder>) -> Self {
        Self {
            finder,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn finder(&self) -> Arc<dyn KafkaConnectFinder> {
        Arc::clone(&self.finder)
    }

    fn poller(&self, spec: PollSpec, kind: &str, arn: &str, operation: Operation) -> Poller {
        Poller::new(spec, ResourceId::new(kind, arn), operation)
            .with_cancellation(self.cancel.clone())
    }
}
