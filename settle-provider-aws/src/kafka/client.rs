//! KafkaFinder backed by the MSK SDK client

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kafka::Client;
use aws_sdk_kafka::types::{
    ClusterOperationInfo, ClusterState as SdkClusterState, ReplicatorState as SdkReplicatorState,
};
use settle_core::{FailureReason, FindError, FindResult};

use super::{
    Cluster, ClusterOperation, Configuration, KafkaFinder, Replicator, VpcConnection,
};
use crate::sdk::{KAFKA_NOT_FOUND, classify, owned};

/// MSK API client
#[derive(Clone)]
pub struct KafkaClient {
    client: Client,
}

impl KafkaClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl KafkaFinder for KafkaClient {
    async fn find_cluster(&self, arn: &str) -> FindResult<Cluster> {
        let output = self
            .client
            .describe_cluster_v2()
            .cluster_arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        let info = output.cluster_info().ok_or(FindError::EmptyResult)?;
        let state: Option<&SdkClusterState> = info.state().into();
        let state_info = info
            .state_info()
            .map(|s| FailureReason::new(owned(s.code()), owned(s.message())));

        Ok(Cluster {
            arn: info.cluster_arn().unwrap_or(arn).to_string(),
            name: owned(info.cluster_name()),
            state: state.map(|s| s.as_str()).unwrap_or_default().into(),
            state_info,
        })
    }

    async fn find_cluster_operation(&self, arn: &str) -> FindResult<ClusterOperation> {
        let output = self
            .client
            .describe_cluster_operation()
            .cluster_operation_arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        let info = output
            .cluster_operation_info()
            .ok_or(FindError::EmptyResult)?;
        Ok(cluster_operation(info, arn))
    }

    async fn find_configuration(&self, arn: &str) -> FindResult<Configuration> {
        let output = self
            .client
            .describe_configuration()
            .arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        Ok(Configuration {
            arn: output.arn().unwrap_or(arn).to_string(),
            name: owned(output.name()),
            state: output
                .state()
                .map(|s| s.as_str())
                .unwrap_or_default()
                .into(),
        })
    }

    async fn find_replicator(&self, arn: &str) -> FindResult<Replicator> {
        let output = self
            .client
            .describe_replicator()
            .replicator_arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        let state: Option<&SdkReplicatorState> = output.replicator_state().into();
        let state_info = output
            .state_info()
            .map(|s| FailureReason::new(owned(s.code()), owned(s.message())));

        Ok(Replicator {
            arn: output.replicator_arn().unwrap_or(arn).to_string(),
            name: owned(output.replicator_name()),
            state: state.map(|s| s.as_str()).unwrap_or_default().into(),
            state_info,
        })
    }

    async fn find_vpc_connection(&self, arn: &str) -> FindResult<VpcConnection> {
        let output = self
            .client
            .describe_vpc_connection()
            .arn(arn)
            .send()
            .await
            .map_err(|e| classify(e, KAFKA_NOT_FOUND))?;

        Ok(VpcConnection {
            arn: output.vpc_connection_arn().unwrap_or(arn).to_string(),
            target_cluster_arn: owned(output.target_cluster_arn()),
            state: output
                .state()
                .map(|s| s.as_str())
                .unwrap_or_default()
                .into(),
        })
    }
}

fn cluster_operation(info: &ClusterOperationInfo, arn: &str) -> ClusterOperation {
    let error_info = info
        .error_info()
        .map(|e| FailureReason::new(owned(e.error_code()), owned(e.error_string())));

    ClusterOperation {
        arn: info.operation_arn().unwrap_or(arn).to_string(),
        operation_type: owned(info.operation_type()),
        state: info.operation_state().unwrap_or_default().into(),
        error_info,
    }
}
