//! Settle AWS Provider
//!
//! State waiters for Amazon MSK, MSK Connect and AWS AppFabric, built on the
//! generic poller in `settle-core`.
//!
//! ## Module Structure
//!
//! - `kafka` - MSK clusters, cluster operations, configurations, replicators, VPC connections
//! - `kafkaconnect` - MSK Connect connectors
//! - `appfabric` - App authorizations and ingestion destinations
//! - `resources` - Status enum macro, default timeouts, waiter catalogue
//! - `sdk` - AWS configuration loading and error classification
//! - `provider` - All waiters wired to real SDK clients
//!
//! CloudWatch RUM operations complete synchronously and have no waiters.

pub mod appfabric;
pub mod kafka;
pub mod kafkaconnect;
pub mod provider;
pub mod resources;
pub mod sdk;

#[cfg(test)]
mod testing;

pub use appfabric::{AppFabricFinder, AppFabricWaiter};
pub use kafka::{KafkaFinder, KafkaWaiter};
pub use kafkaconnect::{KafkaConnectFinder, KafkaConnectWaiter};
pub use provider::AwsWaiters;
pub use resources::{Timeouts, WaiterInfo, waiters};
