// --- File: crates/gatehouse_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // Authority envelope and HTTP client construction
pub mod logging; // Logging utilities
pub mod models; // Devices, gates, locations
pub mod secret; // One-time device secret holder
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, not_found, validation_error, Context,
    ExitStatus, GatehouseError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{client_for, create_client, DEFAULT_TIMEOUT_SECS},
    ApiEnvelope,
};

// Re-export logging utilities for easier access
pub use logging::{init_from_config, init_with_level};

pub use models::{
    Device, DeviceType, DeviceUpdate, Gate, GateRequirements, GateType, GateUpdate, IssuedDevice,
    Location, NewDevice, NewGate, RegeneratedSecret,
};
pub use secret::DeviceSecret;
pub use services::{BoxFuture, HardwareAuthority};
