//! KafkaConnectFinder backed by the MSK Connect SDK client

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kafkaconnect::Client;
use aws_sdk_kafkaconnect::types::ConnectorState as SdkConnectorState;
use settle_core::{FailureReason, FindResult};

use super::{Connector, KafkaConnectFinder};
use crate::sdk::{KAFKA_NOT_FOUND, classify, owned};

/// MSK Connect API client
#[derive(Clone)]
pub struct KafkaConnectClient {
    client: Client,
}

impl KafkaConnectClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl KafkaConnectFinder for KafkaConnectClient {
    async fn find_connector(&self, arn: &str) -> FindResult<Connector> {
        let output = self
            .client
            .describe_connector()
            .connector_arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        let state: Option<&SdkConnectorState> = output.connector_state().into();
        let state_description = output
            .state_description()
            .map(|s| FailureReason::new(owned(s.code()), owned(s.message())));

        Ok(Connector {
            arn: output.connector_arn().unwrap_or(arn).to_string(),
            name: owned(output.connector_name()),
            state: state.map(|s| s.as_str()).unwrap_or_default().into(),
            state_description,
        })
    }
}
