// --- File: crates/gatehouse_hardware/src/error.rs ---
use gatehouse_common::{external_service_error, GatehouseError};
use thiserror::Error;

/// Shown when the authority refuses a request without saying why.
pub const GENERIC_REJECTION_MESSAGE: &str = "The server rejected the request.";

/// Shown for every transport or decoding failure.
pub const GENERIC_TRANSPORT_MESSAGE: &str = "Could not reach the server. Please try again.";

/// Errors of the device provisioning flow.
#[derive(Error, Debug)]
pub enum HardwareError {
    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The authority answered without `success: true`
    #[error("Authority rejected the request: {message}")]
    Rejected { message: String },

    /// Network failure, timeout or a body that is not the expected JSON
    #[error("Authority request failed: {0}")]
    Transport(String),

    /// A submission is already in flight on this flow
    #[error("A request is already in progress")]
    Busy,

    /// There is no issued credential to show or export
    #[error("No device secret is currently issued")]
    NothingIssued,

    /// Both sharing and the clipboard fallback failed
    #[error("Export failed: {0}")]
    Export(String),
}

impl HardwareError {
    /// The text an operator sees.
    ///
    /// Authority messages are passed through verbatim; transport details stay
    /// in the logs.
    pub fn operator_message(&self) -> String {
        match self {
            HardwareError::Validation(message) => message.clone(),
            HardwareError::Rejected { message } => message.clone(),
            HardwareError::Transport(_) => GENERIC_TRANSPORT_MESSAGE.to_string(),
            HardwareError::Busy => "Please wait for the current request to finish.".to_string(),
            HardwareError::NothingIssued => "There is no device secret to show.".to_string(),
            HardwareError::Export(detail) => {
                format!("Could not export the configuration: {}", detail)
            }
        }
    }
}

pub(crate) fn validation(message: impl Into<String>) -> HardwareError {
    HardwareError::Validation(message.into())
}

impl From<reqwest::Error> for HardwareError {
    fn from(err: reqwest::Error) -> Self {
        HardwareError::Transport(err.to_string())
    }
}

/// Convert HardwareError to GatehouseError
impl From<HardwareError> for GatehouseError {
    fn from(err: HardwareError) -> Self {
        let operator_message = err.operator_message();
        match err {
            HardwareError::Validation(_) | HardwareError::Busy => {
                GatehouseError::ValidationError(operator_message)
            }
            HardwareError::Rejected { message } => external_service_error("authority", message),
            HardwareError::Transport(_) => GatehouseError::HttpError(operator_message),
            HardwareError::NothingIssued => GatehouseError::NotFoundError(operator_message),
            HardwareError::Export(_) => GatehouseError::InternalError(operator_message),
        }
    }
}
