// --- File: crates/gatehouse_common/src/services.rs ---
//! Service abstractions for the remote authority.
//!
//! The issuance flow and the inventory only see this trait, so tests can swap
//! the HTTP client for an in-memory authority.

use crate::models::{
    Device, DeviceUpdate, Gate, GateUpdate, IssuedDevice, Location, NewDevice, NewGate,
};
use crate::secret::DeviceSecret;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Operations the authority offers for access-control hardware.
///
/// Every call is sent once; implementations must not retry.
pub trait HardwareAuthority: Send + Sync {
    /// Error type returned by authority operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a device; the response carries the freshly generated secret.
    fn create_device<'a>(
        &'a self,
        device: &'a NewDevice,
    ) -> BoxFuture<'a, IssuedDevice, Self::Error>;

    /// Replace a device's secret. The previous secret stops working.
    fn regenerate_secret<'a>(&'a self, device_id: &'a str)
        -> BoxFuture<'a, DeviceSecret, Self::Error>;

    fn update_device<'a>(
        &'a self,
        device_id: &'a str,
        update: &'a DeviceUpdate,
    ) -> BoxFuture<'a, (), Self::Error>;

    fn delete_device<'a>(&'a self, device_id: &'a str) -> BoxFuture<'a, (), Self::Error>;

    fn list_devices<'a>(&'a self, location_id: &'a str)
        -> BoxFuture<'a, Vec<Device>, Self::Error>;

    fn list_gates<'a>(&'a self, location_id: &'a str) -> BoxFuture<'a, Vec<Gate>, Self::Error>;

    fn create_gate<'a>(&'a self, gate: &'a NewGate) -> BoxFuture<'a, Gate, Self::Error>;

    fn update_gate<'a>(
        &'a self,
        gate_id: &'a str,
        update: &'a GateUpdate,
    ) -> BoxFuture<'a, (), Self::Error>;

    fn delete_gate<'a>(&'a self, gate_id: &'a str) -> BoxFuture<'a, (), Self::Error>;

    /// Every location the session can see (super-admins only).
    fn list_locations(&self) -> BoxFuture<'_, Vec<Location>, Self::Error>;
}
