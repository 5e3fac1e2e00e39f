// Error types for the calculator, configuration and input boundary

use thiserror::Error;

/// Errors raised while turning raw inputs into impact metrics.
#[derive(Error, Debug)]
pub enum ImpactError {
    /// Mass must be a finite, strictly positive number of tons
    #[error("Invalid mass: {0} t (must be a positive number)")]
    InvalidMass(f64),

    /// Velocity must be a finite, strictly positive number of km/s
    #[error("Invalid velocity: {0} km/s (must be a positive number)")]
    InvalidVelocity(f64),

    /// Input record could not be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] serde_json::Error),
}

/// Errors raised while loading or validating `AnimationConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),

    #[error("Failed to install log subscriber: {0}")]
    Logging(String),
}
