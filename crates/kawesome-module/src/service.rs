//! Kubernetes Service generation
//!
//! Exposes the workload inside the cluster with a single ClusterIP port built
//! from the service section of the module config.

use std::collections::BTreeMap;

use kawesome_common::identity::{unique_app_labels, unique_app_name};
use kawesome_common::kube_utils::{HasApiResource, ObjectMeta};
use kawesome_common::{GeneratorRequest, Resource, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModuleConfig;
use crate::validation::port_number;

/// Service type for in-cluster exposure
pub const SERVICE_TYPE_CLUSTER_IP: &str = "ClusterIP";

// =============================================================================
// Service
// =============================================================================

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

impl HasApiResource for Service {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "Service";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Ports
    pub ports: Vec<ServicePort>,
    /// Selector
    pub selector: BTreeMap<String, String>,
    /// Service type
    #[serde(rename = "type")]
    pub type_: String,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    pub name: String,
    /// Port number
    pub port: i32,
    /// Target port
    pub target_port: i32,
    /// Protocol
    pub protocol: String,
}

// =============================================================================
// Compiler
// =============================================================================

/// Compiles the service section of the module config into a Service resource.
pub struct ServiceCompiler;

impl ServiceCompiler {
    /// Build the typed Service for the request's application.
    ///
    /// Ports are narrowed to `int32` here; a config that skipped validation
    /// fails with the same range error validation would report.
    pub fn compile(request: &GeneratorRequest, cfg: &ModuleConfig) -> Result<Service> {
        let name = unique_app_name(&request.project, &request.stack, &request.app);
        let svc = &cfg.service;

        let port = ServicePort {
            name: format!("{}-{}-{}", name, svc.port, svc.protocol.to_lowercase()),
            port: port_number("port", svc.port)?,
            target_port: port_number("targetPort", svc.target_port)?,
            protocol: svc.protocol.clone(),
        };

        let mut metadata = ObjectMeta::new(&name, &request.project);
        metadata.merge_labels(&svc.labels);
        metadata.merge_annotations(&svc.annotations);

        Ok(Service {
            api_version: Service::API_VERSION.to_string(),
            kind: Service::KIND.to_string(),
            metadata,
            spec: ServiceSpec {
                ports: vec![port],
                selector: unique_app_labels(&request.project, &request.app),
                type_: SERVICE_TYPE_CLUSTER_IP.to_string(),
            },
        })
    }

    /// Build the Service and wrap it into a Kubernetes resource.
    pub fn generate(request: &GeneratorRequest, cfg: &ModuleConfig) -> Result<Resource> {
        let service = Self::compile(request, cfg)?;
        let resource = Resource::kubernetes(&service)?;
        debug!(id = %resource.id, "generated service resource");
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RandomPasswordConfig, ServiceConfig};
    use kawesome_common::resource::EXT_GVK;
    use kawesome_common::{Error, ResourceType};
    use serde_json::{json, Value};

    fn request() -> GeneratorRequest {
        GeneratorRequest {
            project: "kawesome-example".to_string(),
            stack: "dev".to_string(),
            app: "kawesome".to_string(),
            ..Default::default()
        }
    }

    fn cfg(protocol: &str) -> ModuleConfig {
        ModuleConfig {
            service: ServiceConfig {
                port: 80,
                target_port: 8080,
                protocol: protocol.to_string(),
                ..Default::default()
            },
            random_password: RandomPasswordConfig { length: 10 },
        }
    }

    #[test]
    fn test_compile_service_shape() {
        let svc = ServiceCompiler::compile(&request(), &cfg("TCP")).unwrap();

        assert_eq!(svc.metadata.name, "kawesome-example-dev-kawesome");
        assert_eq!(svc.metadata.namespace, "kawesome-example");
        assert_eq!(svc.spec.type_, "ClusterIP");
        assert_eq!(
            svc.spec.ports,
            vec![ServicePort {
                name: "kawesome-example-dev-kawesome-80-tcp".to_string(),
                port: 80,
                target_port: 8080,
                protocol: "TCP".to_string(),
            }]
        );
        assert_eq!(svc.spec.selector["app.kubernetes.io/name"], "kawesome");
        assert_eq!(
            svc.spec.selector["app.kubernetes.io/part-of"],
            "kawesome-example"
        );
    }

    #[test]
    fn test_port_name_lowercases_protocol() {
        let svc = ServiceCompiler::compile(&request(), &cfg("UDP")).unwrap();
        assert_eq!(svc.spec.ports[0].name, "kawesome-example-dev-kawesome-80-udp");
        assert_eq!(svc.spec.ports[0].protocol, "UDP");
    }

    #[test]
    fn test_labels_and_annotations_copied() {
        let mut cfg = cfg("TCP");
        cfg.service
            .labels
            .insert("kusionstack.io/module-name".to_string(), "kawesome".to_string());
        cfg.service
            .annotations
            .insert("kusionstack.io/module-version".to_string(), "0.1.0".to_string());

        let svc = ServiceCompiler::compile(&request(), &cfg).unwrap();
        assert_eq!(svc.metadata.labels, cfg.service.labels);
        assert_eq!(svc.metadata.annotations, cfg.service.annotations);
    }

    #[test]
    fn test_compile_rejects_unvalidated_port() {
        let mut cfg = cfg("TCP");
        cfg.service.target_port = 3_000_000_000;
        let err = ServiceCompiler::compile(&request(), &cfg).unwrap_err();
        assert!(matches!(err, Error::Validation(ref v) if v.field() == "targetPort"));
    }

    #[test]
    fn test_generate_resource() {
        let resource = ServiceCompiler::generate(&request(), &cfg("TCP")).unwrap();

        assert_eq!(
            resource.id,
            "v1:Service:kawesome-example:kawesome-example-dev-kawesome"
        );
        assert_eq!(resource.type_, ResourceType::Kubernetes);
        assert_eq!(resource.extensions[EXT_GVK], json!("/v1, Kind=Service"));
        assert_eq!(
            Value::Object(resource.attributes),
            json!({
                "apiVersion": "v1",
                "kind": "Service",
                "metadata": {
                    "name": "kawesome-example-dev-kawesome",
                    "namespace": "kawesome-example",
                },
                "spec": {
                    "ports": [{
                        "name": "kawesome-example-dev-kawesome-80-tcp",
                        "port": 80,
                        "targetPort": 8080,
                        "protocol": "TCP",
                    }],
                    "selector": {
                        "app.kubernetes.io/name": "kawesome",
                        "app.kubernetes.io/part-of": "kawesome-example",
                    },
                    "type": "ClusterIP",
                },
            })
        );
    }
}
