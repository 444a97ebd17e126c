// --- File: crates/gatehouse_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Gatehouse errors.
///
/// Each crate can extend this by implementing From<SpecificError> for GatehouseError.
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing or unusable operator session
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The authority refused the request
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// The operator declined or could not answer a prompt
    #[error("Cancelled: {0}")]
    CancelledError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maps an error to a process exit code for the operator CLI.
pub trait ExitStatus {
    /// Returns the exit code for this error.
    fn exit_code(&self) -> i32;
}

impl ExitStatus for GatehouseError {
    fn exit_code(&self) -> i32 {
        match self {
            GatehouseError::ValidationError(_) => 2,
            GatehouseError::ConfigError(_) | GatehouseError::AuthError(_) => 3,
            GatehouseError::ExternalServiceError { .. } | GatehouseError::NotFoundError(_) => 4,
            GatehouseError::HttpError(_) => 5,
            GatehouseError::CancelledError(_) => 130,
            GatehouseError::InternalError(_) => 1,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, GatehouseError>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, GatehouseError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| GatehouseError::InternalError(format!("{}: {}", context, error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for GatehouseError {
    fn from(err: reqwest::Error) -> Self {
        GatehouseError::HttpError(err.to_string())
    }
}

impl From<std::io::Error> for GatehouseError {
    fn from(err: std::io::Error) -> Self {
        GatehouseError::InternalError(err.to_string())
    }
}

impl From<gatehouse_config::SessionError> for GatehouseError {
    fn from(err: gatehouse_config::SessionError) -> Self {
        GatehouseError::AuthError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> GatehouseError {
    GatehouseError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> GatehouseError {
    GatehouseError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> GatehouseError {
    GatehouseError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GatehouseError {
    GatehouseError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
