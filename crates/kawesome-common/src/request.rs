//! Generator request and response exchanged with the host transport.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::{Patch, Resource};
use crate::workload::Workload;

/// Untyped nested config mapping as supplied by developers or the platform
pub type GenericConfig = Map<String, Value>;

/// Input to a module generator
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorRequest {
    /// Project name (also the Kubernetes namespace of generated resources)
    pub project: String,
    /// Stack name
    pub stack: String,
    /// Application name
    pub app: String,
    /// Workload the module is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,
    /// Module config written by the application developer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_config: Option<GenericConfig>,
    /// Module config imposed by the platform; overrides `dev_config`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_config: Option<GenericConfig>,
}

impl GeneratorRequest {
    /// JSON snapshot used in diagnostics
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable request: {e}>"))
    }
}

/// Output of a module generator
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorResponse {
    /// Generated resources, in generation order
    pub resources: Vec<Resource>,
    /// Workload patch to apply after all modules ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Patch>,
}

/// A module that turns a request into resources.
///
/// Implementations must be stateless across calls so a host can serve
/// requests concurrently from one instance.
pub trait ModuleGenerator: Send + Sync {
    /// Module name (used in logs)
    fn name(&self) -> &str;

    /// Generate resources and an optional patch for the request.
    fn generate(&self, request: &GeneratorRequest) -> crate::Result<GeneratorResponse>;
}
