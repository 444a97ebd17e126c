// --- File: crates/gatehouse_hardware/src/lib.rs ---
// Declare modules within this crate
pub mod bundle;
pub mod client;
pub mod device_code;
#[cfg(test)]
mod device_code_proptest;
pub mod error;
pub mod export;
#[cfg(test)]
mod export_test;
pub mod flow;
pub mod inventory;
#[cfg(test)]
mod inventory_test;
pub mod locations;
#[cfg(test)]
mod test_support;

pub use bundle::{build_config_bundle, slugify, ConfigBundle};
pub use client::HardwareClient;
pub use device_code::{generate_device_code, is_suggested_shape};
pub use error::HardwareError;
pub use export::{export_config_bundle, Clipboard, DirectoryShare, ExportOutcome, ShareTarget};
pub use flow::{
    DeviceDraft, FlowPhase, IssuanceFlow, IssueReceipt, IssuedCredential, RelaySettings,
};
pub use inventory::{GateDraft, LocationInventory};
pub use locations::{list_locations, resolve_location};
