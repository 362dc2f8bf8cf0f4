//! Resource - Identifying the remote object a wait is about

use std::fmt;

/// Unique identifier for a remote resource being awaited
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Human readable resource kind (e.g., "MSK Cluster", "AppFabric Ingestion Destination")
    pub kind: String,
    /// Remote identifier (usually an ARN, or a composite of ARNs)
    pub identifier: String,
}

impl ResourceId {
    pub fn new(kind: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.identifier)
    }
}

/// The provider operation a wait belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Any other named operation (e.g., "operation complete")
    Custom(&'static str),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Custom(name) => write!(f, "{}", name),
        }
    }
}
