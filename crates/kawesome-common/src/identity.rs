//! Resource identity scheme
//!
//! Deterministic naming shared by every resource a module generates: the
//! unique application name, selector labels, resource IDs for Kubernetes and
//! Terraform resources, and path-dependency tokens that let one resource
//! reference another resource's output before it exists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Label key carrying the application name
pub const LABEL_NAME: &str = "app.kubernetes.io/name";

/// Label key carrying the project the application belongs to
pub const LABEL_PART_OF: &str = "app.kubernetes.io/part-of";

/// Registry host assumed when a provider source omits it
pub const DEFAULT_PROVIDER_REGISTRY: &str = "registry.terraform.io";

/// Prefix of path-dependency tokens, resolved by the apply stage
pub const PATH_DEPENDENCY_PREFIX: &str = "$ref";

/// Name of an application unique within its project and stack
pub fn unique_app_name(project: &str, stack: &str, app: &str) -> String {
    format!("{}-{}-{}", project, stack, app)
}

/// Labels selecting every workload object of the application
pub fn unique_app_labels(project: &str, app: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_NAME.to_string(), app.to_string()),
        (LABEL_PART_OF.to_string(), project.to_string()),
    ])
}

/// Resource ID of a Kubernetes object: `{apiVersion}:{Kind}:{namespace}:{name}`.
///
/// Cluster-scoped objects (empty namespace) drop the namespace segment.
pub fn kubernetes_resource_id(
    api_version: &str,
    kind: &str,
    namespace: &str,
    name: &str,
) -> String {
    if namespace.is_empty() {
        format!("{}:{}:{}", api_version, kind, name)
    } else {
        format!("{}:{}:{}:{}", api_version, kind, namespace, name)
    }
}

/// Resource ID of a Terraform resource: `{vendor}:{provider}:{resourceType}:{name}`.
pub fn terraform_resource_id(
    provider: &ProviderConfig,
    resource_type: &str,
    name: &str,
) -> Result<String> {
    let source = provider.parse_source()?;
    Ok(format!(
        "{}:{}:{}:{}",
        source.vendor, source.name, resource_type, name
    ))
}

/// Deferred reference to `field` of the resource `resource_id`.
pub fn path_dependency(resource_id: &str, field: &str) -> String {
    format!("{}.{}.{}", PATH_DEPENDENCY_PREFIX, resource_id, field)
}

// =============================================================================
// Terraform provider
// =============================================================================

/// Terraform provider a resource is managed by
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider source, `vendor/name` or `host/vendor/name`
    pub source: String,
    /// Pinned provider version
    pub version: String,
    /// Provider-level meta arguments, passed through to the apply stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_meta: Option<Map<String, Value>>,
}

/// Parsed form of a provider source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderSource<'a> {
    /// Registry host
    pub host: &'a str,
    /// Provider namespace, e.g. `hashicorp`
    pub vendor: &'a str,
    /// Provider type, e.g. `random`
    pub name: &'a str,
}

impl ProviderConfig {
    /// Create a provider config with no provider meta
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
            provider_meta: None,
        }
    }

    /// Split the source into host, vendor and name
    pub fn parse_source(&self) -> Result<ProviderSource<'_>> {
        if self.source.is_empty() {
            return Err(Error::identity(&self.source, "empty provider source"));
        }

        let parts: Vec<&str> = self.source.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::identity(
                &self.source,
                "provider source has an empty segment",
            ));
        }

        match parts[..] {
            [vendor, name] => Ok(ProviderSource {
                host: DEFAULT_PROVIDER_REGISTRY,
                vendor,
                name,
            }),
            [host, vendor, name] => Ok(ProviderSource { host, vendor, name }),
            _ => Err(Error::identity(
                &self.source,
                "provider source must be 'vendor/name' or 'host/vendor/name'",
            )),
        }
    }

    /// Fully qualified provider address: `{host}/{vendor}/{name}/{version}`
    pub fn registry_address(&self) -> Result<String> {
        let source = self.parse_source()?;
        Ok(format!(
            "{}/{}/{}/{}",
            source.host, source.vendor, source.name, self.version
        ))
    }
}
