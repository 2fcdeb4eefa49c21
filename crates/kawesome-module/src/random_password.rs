//! Terraform random_password generation
//!
//! The password is only known once the apply stage has created the
//! random_password resource, so the workload receives a path dependency on
//! the resource's `result` output instead of a value.

use kawesome_common::identity::{
    path_dependency, terraform_resource_id, unique_app_name, ProviderConfig,
};
use kawesome_common::{Error, GeneratorRequest, Patch, Resource, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ModuleConfig;

/// Provider source of the random provider
pub const RANDOM_PROVIDER_SOURCE: &str = "hashicorp/random";
/// Pinned random provider version
pub const RANDOM_PROVIDER_VERSION: &str = "3.6.0";
/// Terraform resource type
pub const RANDOM_PASSWORD_RESOURCE_TYPE: &str = "random_password";
/// Environment variable the password is injected as
pub const RANDOM_PASSWORD_ENV: &str = "KUSION_KAWESOME_RANDOM_PASSWORD";
/// Output field of random_password holding the password
pub const RANDOM_PASSWORD_OUTPUT: &str = "result";
/// The only special character allowed in generated passwords
pub const OVERRIDE_SPECIAL: &str = "_";

/// Provider managing random_password resources
pub fn random_provider() -> ProviderConfig {
    ProviderConfig::new(RANDOM_PROVIDER_SOURCE, RANDOM_PROVIDER_VERSION)
}

/// random_password resource attributes
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RandomPasswordAttributes {
    /// Password length
    pub length: i64,
    /// Include special characters
    pub special: bool,
    /// Special characters to draw from
    pub override_special: String,
}

/// A random_password resource and the patch that consumes it.
///
/// The two are only meaningful together: the patch references the resource ID.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPasswordOutput {
    /// The Terraform random_password resource
    pub resource: Resource,
    /// Patch injecting the password into the workload environment
    pub patch: Patch,
}

/// Compiles the randomPassword section of the module config.
pub struct RandomPasswordCompiler;

impl RandomPasswordCompiler {
    /// Generate the random_password resource and its environment patch.
    pub fn generate(
        request: &GeneratorRequest,
        cfg: &ModuleConfig,
    ) -> Result<RandomPasswordOutput> {
        Self::generate_with_provider(&random_provider(), request, cfg)
    }

    /// Same as [`Self::generate`] against an explicit provider.
    pub fn generate_with_provider(
        provider: &ProviderConfig,
        request: &GeneratorRequest,
        cfg: &ModuleConfig,
    ) -> Result<RandomPasswordOutput> {
        let attributes = RandomPasswordAttributes {
            length: cfg.random_password.length,
            special: true,
            override_special: OVERRIDE_SPECIAL.to_string(),
        };
        let attributes = match serde_json::to_value(&attributes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(Error::serialization_for(
                    RANDOM_PASSWORD_RESOURCE_TYPE,
                    "attributes must serialize to an object",
                ))
            }
            Err(e) => {
                return Err(Error::serialization_for(
                    RANDOM_PASSWORD_RESOURCE_TYPE,
                    e.to_string(),
                ))
            }
        };

        let name = unique_app_name(&request.project, &request.stack, &request.app);
        let id = terraform_resource_id(provider, RANDOM_PASSWORD_RESOURCE_TYPE, &name)?;
        let resource = Resource::terraform(
            provider,
            RANDOM_PASSWORD_RESOURCE_TYPE,
            &id,
            attributes,
            None,
        )?;

        let patch = Patch::default().with_env(
            RANDOM_PASSWORD_ENV,
            path_dependency(&id, RANDOM_PASSWORD_OUTPUT),
        );

        debug!(id = %id, "generated random_password resource");
        Ok(RandomPasswordOutput { resource, patch })
    }
}
