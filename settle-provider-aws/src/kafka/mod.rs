//! Amazon MSK waiters
//!
//! Every describe call goes through [`KafkaFinder`]; [`KafkaWaiter`] turns
//! those calls into polls with the right [`PollSpec`](settle_core::PollSpec)
//! for each resource and operation.

pub mod client;
pub mod cluster;
pub mod cluster_operation;
pub mod configuration;
pub mod replicator;
pub mod vpc_connection;

use std::sync::Arc;

use async_trait::async_trait;
use settle_core::{CancellationToken, FindResult, Operation, PollSpec, Poller, ResourceId};

pub use client::KafkaClient;
pub use cluster::{Cluster, ClusterState};
pub use cluster_operation::{ClusterOperation, ClusterOperationState};
pub use configuration::{Configuration, ConfigurationState};
pub use replicator::{Replicator, ReplicatorState};
pub use vpc_connection::{VpcConnection, VpcConnectionState};

/// Describe calls against the MSK API
///
/// Implementations return [`FindError::NotFound`](settle_core::FindError::NotFound)
/// when the service reports the resource missing.
#[async_trait]
pub trait KafkaFinder: Send + Sync {
    async fn find_cluster(&self, arn: &str) -> FindResult<Cluster>;

    async fn find_cluster_operation(&self, arn: &str) -> FindResult<ClusterOperation>;

    async fn find_configuration(&self, arn: &str) -> FindResult<Configuration>;

    async fn find_replicator(&self, arn: &str) -> FindResult<Replicator>;

    async fn find_vpc_connection(&self, arn: &str) -> FindResult<VpcConnection>;
}

/// Waits on MSK resources
#[derive(Clone)]
pub struct KafkaWaiter {
    finder: Arc<dyn KafkaFinder>,
    cancel: CancellationToken,
}

impl KafkaWaiter {
    pub fn new(finder: Arc<dyn KafkaFinder>) -> Self {
        Self {
            finder,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn finder(&self) -> Arc<dyn KafkaFinder> {
        Arc::clone(&self.finder)
    }

    fn poller(&self, spec: PollSpec, kind: &str, arn: &str, operation: Operation) -> Poller {
        Poller::new(spec, ResourceId::new(kind, arn), operation)
            .with_cancellation(self.cancel.clone())
    }
}
