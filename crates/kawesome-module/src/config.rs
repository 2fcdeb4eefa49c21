//! Module config and its completion from layered sources
//!
//! The module config is completed from two untyped sources: the developer's
//! config first, then the platform's. Each source is decoded into an overlay
//! schema where every field is optional, and only the fields present in the
//! source are written onto the config. Label and annotation maps merge
//! key-by-key.
//!
//! The target port default (`targetPort = port`) is applied between the two
//! passes, so the platform can still set `targetPort` explicitly but a platform
//! override of `port` alone leaves an already-defaulted `targetPort` untouched.

use std::collections::BTreeMap;

use kawesome_common::{ConfigLayer, Error, GenericConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Typed config of the kawesome module
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Network exposure of the workload
    pub service: ServiceConfig,
    /// Generated secret injected into the workload
    pub random_password: RandomPasswordConfig,
}

/// Service section of the module config
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Exposed port
    pub port: i64,
    /// Container port traffic is forwarded to (defaults to `port`)
    pub target_port: i64,
    /// `TCP` or `UDP`
    pub protocol: String,
    /// Labels attached to the Service
    pub labels: BTreeMap<String, String>,
    /// Annotations attached to the Service
    pub annotations: BTreeMap<String, String>,
}

/// Random password section of the module config
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RandomPasswordConfig {
    /// Length of the generated password
    pub length: i64,
}

// =============================================================================
// Overlay schema
// =============================================================================

/// Fields a config source may set. Absent (or null) fields leave the target alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleConfigOverlay {
    service: Option<ServiceOverlay>,
    random_password: Option<RandomPasswordOverlay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceOverlay {
    port: Option<i64>,
    target_port: Option<i64>,
    protocol: Option<String>,
    labels: Option<BTreeMap<String, String>>,
    annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomPasswordOverlay {
    length: Option<i64>,
}

impl ServiceConfig {
    fn apply(&mut self, overlay: ServiceOverlay) {
        if let Some(port) = overlay.port {
            self.port = port;
        }
        if let Some(target_port) = overlay.target_port {
            self.target_port = target_port;
        }
        if let Some(protocol) = overlay.protocol {
            self.protocol = protocol;
        }
        if let Some(labels) = overlay.labels {
            self.labels.extend(labels);
        }
        if let Some(annotations) = overlay.annotations {
            self.annotations.extend(annotations);
        }
    }
}

impl RandomPasswordConfig {
    fn apply(&mut self, overlay: RandomPasswordOverlay) {
        if let Some(length) = overlay.length {
            self.length = length;
        }
    }
}

impl ModuleConfig {
    /// Complete the config from the developer and platform sources.
    ///
    /// Platform values win over developer values on every field both set.
    pub fn complete(
        &mut self,
        dev_config: Option<&GenericConfig>,
        platform_config: Option<&GenericConfig>,
    ) -> Result<()> {
        if let Some(dev_config) = dev_config {
            self.merge(ConfigLayer::Developer, dev_config)?;
        }

        if self.service.target_port == 0 {
            self.service.target_port = self.service.port;
        }

        if let Some(platform_config) = platform_config {
            self.merge(ConfigLayer::Platform, platform_config)?;
        }

        Ok(())
    }

    /// Write the fields present in `source` onto this config.
    pub fn merge(&mut self, layer: ConfigLayer, source: &GenericConfig) -> Result<()> {
        let overlay: ModuleConfigOverlay = serde_json::from_value(Value::Object(source.clone()))
            .map_err(|e| Error::config(layer, e))?;

        debug!(
            layer = %layer,
            service = overlay.service.is_some(),
            random_password = overlay.random_password.is_some(),
            "merging module config"
        );

        if let Some(service) = overlay.service {
            self.service.apply(service);
        }
        if let Some(random_password) = overlay.random_password {
            self.random_password.apply(random_password);
        }

        Ok(())
    }
}
