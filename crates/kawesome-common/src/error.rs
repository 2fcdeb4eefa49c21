//! Error types for the kawesome module
//!
//! Errors are structured with fields to aid debugging. Each variant names the
//! pipeline stage that produced it; none of them are retryable because the
//! generator is a pure function of its request.

use std::fmt;

use thiserror::Error;

/// Main error type for module generation
#[derive(Debug, Error)]
pub enum Error {
    /// The request cannot be served by this module (missing or wrong workload)
    #[error("precondition failed: {message}")]
    Precondition {
        /// Description of the unmet precondition
        message: String,
    },

    /// A config source could not be decoded onto the module config schema
    #[error("invalid {layer} config: {source}")]
    Config {
        /// Which config layer failed to decode
        layer: ConfigLayer,
        /// The underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// The completed module config violates a constraint
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed input to the resource identity scheme
    #[error("identity error for '{input}': {message}")]
    Identity {
        /// The offending input (e.g. a provider source)
        input: String,
        /// Description of what's malformed
        message: String,
    },

    /// A typed resource could not be converted into its attribute payload
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Unexpected fault caught at the generator boundary
    #[error("internal error in phase {phase}: {message} (request: {request})")]
    Internal {
        /// Pipeline phase that was running when the fault occurred
        phase: String,
        /// Panic payload or other fault description
        message: String,
        /// JSON snapshot of the request being served
        request: String,
        /// Captured backtrace (empty unless RUST_BACKTRACE is set)
        backtrace: String,
    },
}

impl Error {
    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition {
            message: msg.into(),
        }
    }

    /// Create a config decode error for the given layer
    pub fn config(layer: ConfigLayer, source: serde_json::Error) -> Self {
        Self::Config { layer, source }
    }

    /// Create an identity error
    pub fn identity(input: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Identity {
            input: input.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an internal error
    pub fn internal(
        phase: impl Into<String>,
        msg: impl Into<String>,
        request: impl Into<String>,
        backtrace: impl Into<String>,
    ) -> Self {
        Self::Internal {
            phase: phase.into(),
            message: msg.into(),
            request: request.into(),
            backtrace: backtrace.into(),
        }
    }

    /// Stable error class name, used as a structured logging field
    pub fn category(&self) -> &'static str {
        match self {
            Self::Precondition { .. } => "precondition",
            Self::Config { .. } => "config",
            Self::Validation(_) => "validation",
            Self::Identity { .. } => "identity",
            Self::Serialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether the error was caused by the request rather than by a module defect
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Precondition { .. } | Self::Config { .. } | Self::Validation(_)
        )
    }
}

/// The two config sources merged into the module config
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Config written by the application developer
    Developer,
    /// Config imposed by the platform team; takes precedence
    Platform,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Developer => write!(f, "developer"),
            Self::Platform => write!(f, "platform"),
        }
    }
}

/// Constraint violations found while validating the completed module config
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Integer outside its allowed range
    #[error("{field} must be {}, got {value}", describe_range(.min, .max))]
    Range {
        /// Config key path
        field: &'static str,
        /// Value found
        value: i64,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound, if any
        max: Option<i64>,
    },

    /// String outside its allowed set
    #[error("{field} must be one of [{}], got '{value}'", .allowed.join(", "))]
    Enum {
        /// Config key path
        field: &'static str,
        /// Value found
        value: String,
        /// Accepted values
        allowed: &'static [&'static str],
    },
}

fn describe_range(min: &i64, max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("between {} and {}", min, max),
        None => format!("at least {}", min),
    }
}

impl ValidationError {
    /// Config key path of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Range { field, .. } | Self::Enum { field, .. } => *field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let err = ValidationError::Range {
            field: "port",
            value: 0,
            min: 1,
            max: Some(65535),
        };
        assert_eq!(err.to_string(), "port must be between 1 and 65535, got 0");
        assert_eq!(err.field(), "port");
    }

    #[test]
    fn test_enum_error_display() {
        let err = ValidationError::Enum {
            field: "protocol",
            value: "STCP".to_string(),
            allowed: &["TCP", "UDP"],
        };
        assert_eq!(
            err.to_string(),
            "protocol must be one of [TCP, UDP], got 'STCP'"
        );
    }

    #[test]
    fn test_config_error_keeps_source() {
        let source = serde_json::from_str::<i32>("\"x\"").unwrap_err();
        let err = Error::config(ConfigLayer::Platform, source);
        assert!(err.to_string().starts_with("invalid platform config"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.category(), "config");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_internal_error_is_not_user_error() {
        let err = Error::internal("merge", "boom", "{}", "");
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("in phase merge"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_validation_converts_from() {
        let err: Error = ValidationError::Range {
            field: "randomPassword.length",
            value: 0,
            min: 1,
            max: None,
        }
        .into();
        assert_eq!(err.category(), "validation");
        assert_eq!(
            err.to_string(),
            "validation error: randomPassword.length must be at least 1, got 0"
        );
    }
}
