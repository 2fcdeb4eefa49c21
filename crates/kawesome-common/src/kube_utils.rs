//! Kubernetes object helpers shared by resource synthesizers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// ObjectMeta
// =============================================================================

/// Kubernetes metadata for generated objects.
///
/// Unlike the API server's ObjectMeta this carries no defaults: labels and
/// annotations start empty and are filled from module config.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create metadata with no labels or annotations
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Overlay labels key-by-key; incoming values win
    pub fn merge_labels(&mut self, labels: &BTreeMap<String, String>) {
        self.labels
            .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Overlay annotations key-by-key; incoming values win
    pub fn merge_annotations(&mut self, annotations: &BTreeMap<String, String>) {
        self.annotations
            .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

// =============================================================================
// HasApiResource Trait
// =============================================================================

/// Types with a compile-time known apiVersion and kind.
///
/// # Example
/// ```ignore
/// impl HasApiResource for Service {
///     const API_VERSION: &'static str = "v1";
///     const KIND: &'static str = "Service";
///
///     fn metadata(&self) -> &ObjectMeta {
///         &self.metadata
///     }
/// }
/// ```
pub trait HasApiResource {
    /// apiVersion, e.g. `v1` or `apps/v1`
    const API_VERSION: &'static str;
    /// Kind, e.g. `Service`
    const KIND: &'static str;

    /// Object metadata, used for resource identity
    fn metadata(&self) -> &ObjectMeta;

    /// Group/version/kind rendered as `{group}/{version}, Kind={kind}`
    fn gvk() -> String {
        gvk_string(Self::API_VERSION, Self::KIND)
    }

    /// Resource ID derived from apiVersion, kind, namespace and name
    fn resource_id(&self) -> String {
        let meta = self.metadata();
        crate::identity::kubernetes_resource_id(
            Self::API_VERSION,
            Self::KIND,
            &meta.namespace,
            &meta.name,
        )
    }
}

/// Split an apiVersion into (group, version). The core group is empty.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Render a GVK the way Kubernetes tooling prints it: `/v1, Kind=Service`,
/// `apps/v1, Kind=Deployment`.
pub fn gvk_string(api_version: &str, kind: &str) -> String {
    let (group, version) = split_api_version(api_version);
    format!("{}/{}, Kind={}", group, version, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gvk_core_group() {
        assert_eq!(gvk_string("v1", "Service"), "/v1, Kind=Service");
    }

    #[test]
    fn test_gvk_named_group() {
        assert_eq!(gvk_string("apps/v1", "Deployment"), "apps/v1, Kind=Deployment");
    }

    #[test]
    fn test_new_metadata_has_no_labels() {
        let meta = ObjectMeta::new("svc", "ns");
        assert!(meta.labels.is_empty());
        assert!(meta.annotations.is_empty());
    }

    #[test]
    fn test_merge_labels_overwrites_on_collision() {
        let mut meta = ObjectMeta::new("svc", "ns");
        meta.labels.insert("team".to_string(), "a".to_string());
        meta.labels.insert("tier".to_string(), "web".to_string());

        let incoming = BTreeMap::from([("team".to_string(), "b".to_string())]);
        meta.merge_labels(&incoming);

        assert_eq!(meta.labels.get("team").map(String::as_str), Some("b"));
        assert_eq!(meta.labels.get("tier").map(String::as_str), Some("web"));
    }

    #[test]
    fn test_empty_maps_skipped_in_json() {
        let value = serde_json::to_value(ObjectMeta::new("svc", "ns")).unwrap();
        assert_eq!(value, serde_json::json!({"name": "svc", "namespace": "ns"}));
    }
}
