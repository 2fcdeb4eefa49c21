//! Resource and patch wire shapes consumed by the apply stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::ProviderConfig;
use crate::kube_utils::HasApiResource;
use crate::{Error, Result};

/// Extension key recording the group/version/kind of a Kubernetes resource
pub const EXT_GVK: &str = "GVK";
/// Extension key recording the Terraform provider address
pub const EXT_PROVIDER: &str = "provider";
/// Extension key recording Terraform provider meta arguments
pub const EXT_PROVIDER_META: &str = "providerMeta";
/// Extension key recording the Terraform resource type
pub const EXT_RESOURCE_TYPE: &str = "resourceType";

/// Engine that manages a resource
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceType {
    /// Applied to a Kubernetes cluster
    Kubernetes,
    /// Applied through a Terraform provider
    Terraform,
}

/// A declared unit of infrastructure
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Stable identifier, see [`crate::identity`]
    pub id: String,
    /// Managing engine
    #[serde(rename = "type")]
    pub type_: ResourceType,
    /// Native representation of the resource
    pub attributes: Map<String, Value>,
    /// IDs of resources that must be applied first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
    /// Engine-specific metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl Resource {
    /// Wrap a typed Kubernetes object.
    ///
    /// The ID comes from the object's apiVersion, kind and metadata.
    /// Attributes are the object's JSON form; extensions record its GVK.
    pub fn kubernetes<T>(object: &T) -> Result<Self>
    where
        T: Serialize + HasApiResource,
    {
        let attributes = match serde_json::to_value(object) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(Error::serialization_for(
                    T::KIND,
                    format!("expected an object, got {other}"),
                ))
            }
            Err(e) => return Err(Error::serialization_for(T::KIND, e.to_string())),
        };

        let mut extensions = Map::new();
        extensions.insert(EXT_GVK.to_string(), Value::String(T::gvk()));

        Ok(Self {
            id: object.resource_id(),
            type_: ResourceType::Kubernetes,
            attributes,
            depends_on: None,
            extensions,
        })
    }

    /// Wrap a Terraform resource.
    ///
    /// Extensions record the provider address, provider meta and resource type.
    pub fn terraform(
        provider: &ProviderConfig,
        resource_type: &str,
        id: impl Into<String>,
        attributes: Map<String, Value>,
        depends_on: Option<Vec<String>>,
    ) -> Result<Self> {
        let mut extensions = Map::new();
        extensions.insert(
            EXT_PROVIDER.to_string(),
            Value::String(provider.registry_address()?),
        );
        extensions.insert(
            EXT_PROVIDER_META.to_string(),
            provider
                .provider_meta
                .clone()
                .map(Value::Object)
                .unwrap_or(Value::Null),
        );
        extensions.insert(
            EXT_RESOURCE_TYPE.to_string(),
            Value::String(resource_type.to_string()),
        );

        Ok(Self {
            id: id.into(),
            type_: ResourceType::Terraform,
            attributes,
            depends_on,
            extensions,
        })
    }
}

/// Environment variable injected into the workload
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Literal value or path-dependency token
    pub value: String,
}

impl EnvVar {
    /// Create an environment variable
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Changes merged into the workload after all modules ran
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patch {
    /// Environment variables, in injection order
    #[serde(default)]
    pub environments: Vec<EnvVar>,
}

impl Patch {
    /// Append an environment variable
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environments.push(EnvVar::new(name, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube_utils::ObjectMeta;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ConfigMap {
        api_version: String,
        kind: String,
        metadata: ObjectMeta,
    }

    impl HasApiResource for ConfigMap {
        const API_VERSION: &'static str = "v1";
        const KIND: &'static str = "ConfigMap";

        fn metadata(&self) -> &ObjectMeta {
            &self.metadata
        }
    }

    #[test]
    fn test_wrap_kubernetes_resource() {
        let cm = ConfigMap {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            metadata: ObjectMeta::new("cfg", "ns"),
        };
        let resource = Resource::kubernetes(&cm).unwrap();

        assert_eq!(resource.id, "v1:ConfigMap:ns:cfg");
        assert_eq!(resource.type_, ResourceType::Kubernetes);
        assert_eq!(resource.attributes["kind"], json!("ConfigMap"));
        assert_eq!(resource.extensions[EXT_GVK], json!("/v1, Kind=ConfigMap"));
        assert!(resource.depends_on.is_none());
    }

    #[test]
    fn test_wrap_terraform_resource() {
        let provider = ProviderConfig::new("hashicorp/random", "3.6.0");
        let attrs = json!({"length": 10}).as_object().cloned().unwrap();
        let resource = Resource::terraform(
            &provider,
            "random_password",
            "hashicorp:random:random_password:x",
            attrs,
            None,
        )
        .unwrap();

        assert_eq!(resource.type_, ResourceType::Terraform);
        assert_eq!(
            Value::Object(resource.extensions),
            json!({
                "provider": "registry.terraform.io/hashicorp/random/3.6.0",
                "providerMeta": null,
                "resourceType": "random_password",
            })
        );
    }

    #[test]
    fn test_wrap_terraform_rejects_bad_provider() {
        let provider = ProviderConfig::new("random", "3.6.0");
        let err = Resource::terraform(&provider, "random_password", "x", Map::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::Identity { .. }));
    }

    #[test]
    fn test_resource_wire_shape() {
        let resource = Resource {
            id: "a".to_string(),
            type_: ResourceType::Terraform,
            attributes: Map::new(),
            depends_on: Some(vec!["b".to_string()]),
            extensions: Map::new(),
        };
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({"id": "a", "type": "Terraform", "attributes": {}, "dependsOn": ["b"]})
        );
    }

    #[test]
    fn test_patch_keeps_order() {
        let patch = Patch::default().with_env("B", "2").with_env("A", "1");
        let names: Vec<_> = patch.environments.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
