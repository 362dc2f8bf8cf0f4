//! Shared definitions for resource waiters
//!
//! This module defines:
//! - Typed status enums (with a wire-string boundary)
//! - Default operation timeouts
//! - The catalogue of every waiter this provider offers

use std::time::Duration;

use settle_core::{Operation, PollSpec};

// =============================================================================
// Status Definitions
// =============================================================================

/// Define a status enum mapped to and from its wire strings
///
/// Values the API returns that are not listed are kept in `Unknown` so they
/// still round-trip into error messages.
macro_rules! define_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(value) => value.as_str(),
                }
            }

            /// All known wire values
            pub fn values() -> &'static [&'static str] {
                &[$($wire),+]
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Unknown(other.to_string()),
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use define_status;

// =============================================================================
// Timeouts
// =============================================================================

/// Default timeouts for a resource's create, update and delete waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    pub const fn minutes(create: u64, update: u64, delete: u64) -> Self {
        Self {
            create: Duration::from_secs(create * 60),
            update: Duration::from_secs(update * 60),
            delete: Duration::from_secs(delete * 60),
        }
    }

    /// Timeout for the given operation; custom operations use the update timeout
    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Delete => self.delete,
            Operation::Update | Operation::Custom(_) => self.update,
        }
    }
}

// =============================================================================
// Waiter Catalogue
// =============================================================================

/// Description of one waiter: which resource, which operation, what it polls for
#[derive(Debug, Clone)]
pub struct WaiterInfo {
    pub resource: &'static str,
    pub operation: Operation,
    pub spec: PollSpec,
}

impl WaiterInfo {
    fn new(resource: &'static str, operation: Operation, spec: PollSpec) -> Self {
        Self {
            resource,
            operation,
            spec,
        }
    }
}

/// Returns every waiter this provider offers, with default timeouts
pub fn waiters() -> Vec<WaiterInfo> {
    use crate::appfabric::{app_authorization as auth, ingestion_destination as dest};
    use crate::kafka::{cluster, cluster_operation, configuration, replicator, vpc_connection};
    use crate::kafkaconnect::connector;

    vec![
        WaiterInfo::new(
            cluster::KIND,
            Operation::Create,
            cluster::created_spec(cluster::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            cluster::KIND,
            Operation::Delete,
            cluster::deleted_spec(cluster::TIMEOUTS.delete),
        ),
        WaiterInfo::new(
            cluster_operation::KIND,
            cluster_operation::COMPLETED,
            cluster_operation::completed_spec(cluster_operation::TIMEOUT),
        ),
        WaiterInfo::new(
            configuration::KIND,
            Operation::Delete,
            configuration::deleted_spec(configuration::TIMEOUTS.delete),
        ),
        WaiterInfo::new(
            replicator::KIND,
            Operation::Create,
            replicator::created_spec(replicator::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            replicator::KIND,
            Operation::Update,
            replicator::updated_spec(replicator::TIMEOUTS.update),
        ),
        WaiterInfo::new(
            replicator::KIND,
            Operation::Delete,
            replicator::deleted_spec(replicator::TIMEOUTS.delete),
        ),
        WaiterInfo::new(
            vpc_connection::KIND,
            Operation::Create,
            vpc_connection::created_spec(vpc_connection::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            vpc_connection::KIND,
            Operation::Delete,
            vpc_connection::deleted_spec(vpc_connection::TIMEOUTS.delete),
        ),
        WaiterInfo::new(
            connector::KIND,
            Operation::Create,
            connector::created_spec(connector::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            connector::KIND,
            Operation::Update,
            connector::updated_spec(connector::TIMEOUTS.update),
        ),
        WaiterInfo::new(
            connector::KIND,
            Operation::Delete,
            connector::deleted_spec(connector::TIMEOUTS.delete),
        ),
        WaiterInfo::new(
            auth::KIND,
            Operation::Create,
            auth::created_spec(auth::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            auth::KIND,
            Operation::Update,
            auth::updated_spec(auth::TIMEOUTS.update),
        ),
        WaiterInfo::new(
            dest::KIND,
            Operation::Create,
            dest::created_spec(dest::TIMEOUTS.create),
        ),
        WaiterInfo::new(
            dest::KIND,
            Operation::Update,
            dest::updated_spec(dest::TIMEOUTS.update),
        ),
        WaiterInfo::new(
            dest::KIND,
            Operation::Delete,
            dest::deleted_spec(dest::TIMEOUTS.delete),
        ),
    ]
}
