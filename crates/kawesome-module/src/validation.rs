//! Semantic validation of the completed module config.

use kawesome_common::ValidationError;

use crate::config::ModuleConfig;

/// Lowest valid port number
pub const MIN_PORT: i64 = 1;
/// Highest valid port number
pub const MAX_PORT: i64 = 65535;
/// Protocols a Service port may use
pub const SUPPORTED_PROTOCOLS: &[&str] = &["TCP", "UDP"];
/// Shortest password the module will generate
pub const MIN_PASSWORD_LENGTH: i64 = 1;

impl ModuleConfig {
    /// Check ranges and enumerations, stopping at the first violation.
    ///
    /// Checks run in order: port, targetPort, protocol, randomPassword.length.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_port("port", self.service.port)?;
        check_port("targetPort", self.service.target_port)?;

        if !SUPPORTED_PROTOCOLS.contains(&self.service.protocol.as_str()) {
            return Err(ValidationError::Enum {
                field: "protocol",
                value: self.service.protocol.clone(),
                allowed: SUPPORTED_PROTOCOLS,
            });
        }

        let length = self.random_password.length;
        if length < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::Range {
                field: "randomPassword.length",
                value: length,
                min: MIN_PASSWORD_LENGTH,
                max: None,
            });
        }

        Ok(())
    }
}

fn check_port(field: &'static str, port: i64) -> Result<(), ValidationError> {
    port_number(field, port).map(|_| ())
}

/// Narrow a port to the Kubernetes `int32` wire type, rejecting values
/// outside `[MIN_PORT, MAX_PORT]`.
pub(crate) fn port_number(field: &'static str, port: i64) -> Result<i32, ValidationError> {
    let out_of_range = || ValidationError::Range {
        field,
        value: port,
        min: MIN_PORT,
        max: Some(MAX_PORT),
    };
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(out_of_range());
    }
    i32::try_from(port).map_err(|_| out_of_range())
}
