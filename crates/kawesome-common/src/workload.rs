//! Workload descriptor attached to a generator request.
//!
//! The workload schema itself belongs to the platform; modules only need to
//! know which kind of workload they are attached to, so the bodies are kept
//! as opaque field maps.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The deployable unit generated resources attach to, tagged by `type`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Workload {
    /// Long-running, network-reachable workload
    Service(ServiceWorkload),
    /// Run-to-completion workload
    Job(JobWorkload),
    /// Any workload type this module does not know about
    #[serde(other)]
    Other,
}

/// Long-running workload body
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceWorkload {
    /// Workload fields, owned by the platform schema
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Run-to-completion workload body
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct JobWorkload {
    /// Workload fields, owned by the platform schema
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Discriminant of a [`Workload`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadKind {
    /// See [`Workload::Service`]
    Service,
    /// See [`Workload::Job`]
    Job,
    /// See [`Workload::Other`]
    Other,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "Service"),
            Self::Job => write!(f, "Job"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl Workload {
    /// Kind of this workload
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::Service(_) => WorkloadKind::Service,
            Self::Job(_) => WorkloadKind::Job,
            Self::Other => WorkloadKind::Other,
        }
    }

    /// Whether network resources (Services, ports) can be bound to this workload
    pub fn is_network_exposable(&self) -> bool {
        matches!(self, Self::Service(_))
    }
}
