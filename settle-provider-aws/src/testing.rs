//! In-memory finders for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use settle_core::{FindError, FindResult};

use crate::appfabric::{AppAuthorization, AppFabricFinder, IngestionDestination};
use crate::kafka::{
    Cluster, ClusterOperation, Configuration, KafkaFinder, Replicator, VpcConnection,
};
use crate::kafkaconnect::{Connector, KafkaConnectFinder};

/// One scripted finder response
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Found(T),
    NotFound,
    Error(&'static str),
}

/// Replays replies in order; the last one repeats forever
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    last: Mutex<Option<Reply<T>>>,
    keys: Mutex<Vec<String>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            keys: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> Script<T> {
    pub fn new(replies: Vec<Reply<T>>) -> Self {
        let script = Self::default();
        *script.replies.lock().unwrap() = replies.into();
        script
    }

    fn next(&self, key: String) -> FindResult<T> {
        self.keys.lock().unwrap().push(key);
        let reply = match self.replies.lock().unwrap().pop_front() {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => match self.last.lock().unwrap().clone() {
                Some(reply) => reply,
                None => return Err(FindError::remote(std::io::Error::other("unscripted call"))),
            },
        };
        match reply {
            Reply::Found(object) => Ok(object),
            Reply::NotFound => Err(FindError::not_found("resource not found")),
            Reply::Error(message) => Err(FindError::remote(std::io::Error::other(message))),
        }
    }

    /// Number of finder calls so far
    pub fn calls(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    /// Keys the finder was called with, in order
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeKafka {
    pub clusters: Script<Cluster>,
    pub operations: Script<ClusterOperation>,
    pub configurations: Script<Configuration>,
    pub replicators: Script<Replicator>,
    pub vpc_connections: Script<VpcConnection>,
}

#[async_trait]
impl KafkaFinder for FakeKafka {
    async fn find_cluster(&self, arn: &str) -> FindResult<Cluster> {
        self.clusters.next(arn.to_string())
    }

    async fn find_cluster_operation(&self, arn: &str) -> FindResult<ClusterOperation> {
        self.operations.next(arn.to_string())
    }

    async fn find_configuration(&self, arn: &str) -> FindResult<Configuration> {
        self.configurations.next(arn.to_string())
    }

    async fn find_replicator(&self, arn: &str) -> FindResult<Replicator> {
        self.replicators.next(arn.to_string())
    }

    async fn find_vpc_connection(&self, arn: &str) -> FindResult<VpcConnection> {
        self.vpc_connections.next(arn.to_string())
    }
}

#[derive(Default)]
pub struct FakeKafkaConnect {
    pub connectors: Script<Connector>,
}

#[async_trait]
impl KafkaConnectFinder for FakeKafkaConnect {
    async fn find_connector(&self, arn: &str) -> FindResult<Connector> {
        self.connectors.next(arn.to_string())
    }
}

#[derive(Default)]
pub struct FakeAppFabric {
    pub authorizations: Script<AppAuthorization>,
    pub destinations: Script<IngestionDestination>,
}

#[async_trait]
impl AppFabricFinder for FakeAppFabric {
    async fn find_app_authorization(
        &self,
        app_bundle: &str,
        authorization: &str,
    ) -> FindResult<AppAuthorization> {
        self.authorizations
            .next(format!("{},{}", app_bundle, authorization))
    }

    async fn find_ingestion_destination(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
    ) -> FindResult<IngestionDestination> {
        self.destinations
            .next(format!("{},{},{}", app_bundle, ingestion, destination))
    }
}
