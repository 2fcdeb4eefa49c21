//! Kawesome module generation pipeline
//!
//! Turns a generator request into:
//!
//! - **Service**: a Kubernetes ClusterIP Service exposing the workload
//! - **random_password**: a Terraform resource generating a secret
//! - **Patch**: an environment variable carrying a path dependency on the
//!   password, resolved at apply time
//!
//! # Usage
//!
//! ```rust,ignore
//! let response = KawesomeGenerator::new().generate(&request)?;
//! ```

pub mod config;
pub mod generator;
pub mod random_password;
pub mod service;
pub mod validation;

pub use config::{ModuleConfig, RandomPasswordConfig, ServiceConfig};
pub use generator::{GeneratePhase, KawesomeGenerator, MODULE_NAME};
pub use random_password::{RandomPasswordCompiler, RandomPasswordOutput};
pub use service::ServiceCompiler;
