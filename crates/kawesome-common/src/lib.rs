//! Common types for kawesome: generator request/response, resource wire
//! shapes, the resource identity scheme, and errors.

#![deny(missing_docs)]

pub mod error;
pub mod identity;
pub mod kube_utils;
pub mod request;
pub mod resource;
pub mod workload;

pub use error::{ConfigLayer, Error, ValidationError};
pub use request::{GeneratorRequest, GeneratorResponse, GenericConfig, ModuleGenerator};
pub use resource::{EnvVar, Patch, Resource, ResourceType};
pub use workload::{Workload, WorkloadKind};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
