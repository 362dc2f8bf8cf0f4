//! AWS waiter set wired to real SDK clients

use std::sync::Arc;

use settle_core::CancellationToken;

use crate::appfabric::{AppFabricClient, AppFabricWaiter};
use crate::kafka::{KafkaClient, KafkaWaiter};
use crate::kafkaconnect::{KafkaConnectClient, KafkaConnectWaiter};
use crate::sdk;

/// One waiter per service, sharing a single AWS configuration
#[derive(Clone)]
pub struct AwsWaiters {
    pub kafka: KafkaWaiter,
    pub kafka_connect: KafkaConnectWaiter,
    pub appfabric: AppFabricWaiter,
}

impl AwsWaiters {
    /// Load AWS configuration and build a client per service
    pub async fn new(region: Option<&str>) -> Self {
        let config = sdk::load_config(region).await;
        log::debug!(
            "Loaded AWS configuration (region: {})",
            config
                .region()
                .map(|r| r.as_ref())
                .unwrap_or("<unset>")
        );

        Self {
            kafka: KafkaWaiter::new(Arc::new(KafkaClient::new(&config))),
            kafka_connect: KafkaConnectWaiter::new(Arc::new(KafkaConnectClient::new(&config))),
            appfabric: AppFabricWaiter::new(Arc::new(AppFabricClient::new(&config))),
        }
    }

    /// Stop every wait started from this set when `token` is cancelled
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self {
            kafka: self.kafka.with_cancellation(token.clone()),
            kafka_connect: self.kafka_connect.with_cancellation(token.clone()),
            appfabric: self.appfabric.with_cancellation(token),
        }
    }
}
