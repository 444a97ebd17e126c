// In-memory authority for unit tests.

use crate::error::HardwareError;
use gatehouse_common::{
    BoxFuture, Device, DeviceSecret, DeviceUpdate, Gate, GateUpdate, HardwareAuthority,
    IssuedDevice, Location, NewDevice, NewGate,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDevice(NewDevice),
    RegenerateSecret(String),
    UpdateDevice(String, DeviceUpdate),
    DeleteDevice(String),
    ListDevices(String),
    ListGates(String),
    CreateGate(NewGate),
    UpdateGate(String, GateUpdate),
    DeleteGate(String),
    ListLocations,
}

#[derive(Default)]
pub struct FakeAuthority {
    calls: Mutex<Vec<Call>>,
    devices: Mutex<Vec<Device>>,
    gates: Mutex<Vec<Gate>>,
    next_error: Mutex<Option<HardwareError>>,
    listing_error: Mutex<Option<HardwareError>>,
    issued: Mutex<u32>,
    hold: Option<Arc<Notify>>,
}

impl FakeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuance and regeneration wait for `release` before answering.
    pub fn holding(release: Arc<Notify>) -> Self {
        Self {
            hold: Some(release),
            ..Self::default()
        }
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        *self.devices.lock().unwrap() = devices;
        self
    }

    /// The next call fails with `err`.
    pub fn fail_next(&self, err: HardwareError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    /// The next device listing fails with `err`; other calls are unaffected.
    pub fn fail_next_listing(&self, err: HardwareError) {
        *self.listing_error.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), HardwareError> {
        self.calls.lock().unwrap().push(call);
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_secret(&self) -> String {
        let mut issued = self.issued.lock().unwrap();
        *issued += 1;
        format!("secret-{}", *issued)
    }

    async fn wait_for_release(&self) {
        if let Some(release) = &self.hold {
            release.notified().await;
        }
    }
}

pub fn device(id: &str, code: &str, name: &str) -> Device {
    Device {
        id: id.to_string(),
        device_code: code.to_string(),
        device_name: name.to_string(),
        device_type: gatehouse_common::DeviceType::Gate,
        gate_id: None,
        location_id: Some("loc-1".to_string()),
        is_entry: true,
        is_exit: false,
        relay_number: 2,
        pulse_duration_ms: 500,
        is_active: true,
        last_seen_at: None,
        last_ip: None,
        notes: None,
        extra: BTreeMap::new(),
    }
}

impl HardwareAuthority for FakeAuthority {
    type Error = HardwareError;

    fn create_device<'a>(
        &'a self,
        device: &'a NewDevice,
    ) -> BoxFuture<'a, IssuedDevice, Self::Error> {
        Box::pin(async move {
            self.wait_for_release().await;
            self.record(Call::CreateDevice(device.clone()))?;
            let id = format!("dev-{}", self.devices.lock().unwrap().len() + 1);
            let mut stored = self::device(&id, &device.device_code, &device.device_name);
            stored.relay_number = device.relay_number;
            stored.pulse_duration_ms = device.pulse_duration_ms;
            self.devices.lock().unwrap().push(stored);
            Ok(IssuedDevice {
                id,
                device_code: device.device_code.clone(),
                device_name: device.device_name.clone(),
                device_secret: DeviceSecret::new(self.next_secret()),
            })
        })
    }

    fn regenerate_secret<'a>(
        &'a self,
        device_id: &'a str,
    ) -> BoxFuture<'a, DeviceSecret, Self::Error> {
        Box::pin(async move {
            self.wait_for_release().await;
            self.record(Call::RegenerateSecret(device_id.to_string()))?;
            Ok(DeviceSecret::new(self.next_secret()))
        })
    }

    fn update_device<'a>(
        &'a self,
        device_id: &'a str,
        update: &'a DeviceUpdate,
    ) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(Call::UpdateDevice(device_id.to_string(), update.clone()))?;
            let mut devices = self.devices.lock().unwrap();
            if let Some(device) = devices.iter_mut().find(|d| d.id == device_id) {
                if let Some(name) = &update.device_name {
                    device.device_name = name.clone();
                }
                if let Some(is_active) = update.is_active {
                    device.is_active = is_active;
                }
            }
            Ok(())
        })
    }

    fn delete_device<'a>(&'a self, device_id: &'a str) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(Call::DeleteDevice(device_id.to_string()))?;
            self.devices.lock().unwrap().retain(|d| d.id != device_id);
            Ok(())
        })
    }

    fn list_devices<'a>(
        &'a self,
        location_id: &'a str,
    ) -> BoxFuture<'a, Vec<Device>, Self::Error> {
        Box::pin(async move {
            self.record(Call::ListDevices(location_id.to_string()))?;
            if let Some(err) = self.listing_error.lock().unwrap().take() {
                return Err(err);
            }
            Ok(self.devices.lock().unwrap().clone())
        })
    }

    fn list_gates<'a>(&'a self, location_id: &'a str) -> BoxFuture<'a, Vec<Gate>, Self::Error> {
        Box::pin(async move {
            self.record(Call::ListGates(location_id.to_string()))?;
            Ok(self.gates.lock().unwrap().clone())
        })
    }

    fn create_gate<'a>(&'a self, gate: &'a NewGate) -> BoxFuture<'a, Gate, Self::Error> {
        Box::pin(async move {
            self.record(Call::CreateGate(gate.clone()))?;
            let created = Gate {
                id: format!("gate-{}", self.gates.lock().unwrap().len() + 1),
                name: gate.name.clone(),
                gate_type: gate.gate_type,
                is_checkpoint: gate.is_checkpoint,
                is_active: true,
                location_id: Some(gate.location_id.clone()),
                requirements: gate.requirements,
            };
            self.gates.lock().unwrap().push(created.clone());
            Ok(created)
        })
    }

    fn update_gate<'a>(
        &'a self,
        gate_id: &'a str,
        update: &'a GateUpdate,
    ) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(Call::UpdateGate(gate_id.to_string(), update.clone()))?;
            let mut gates = self.gates.lock().unwrap();
            if let Some(gate) = gates.iter_mut().find(|g| g.id == gate_id) {
                if let Some(is_active) = update.is_active {
                    gate.is_active = is_active;
                }
                if let Some(name) = &update.name {
                    gate.name = name.clone();
                }
            }
            Ok(())
        })
    }

    fn delete_gate<'a>(&'a self, gate_id: &'a str) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(Call::DeleteGate(gate_id.to_string()))?;
            self.gates.lock().unwrap().retain(|g| g.id != gate_id);
            Ok(())
        })
    }

    fn list_locations(&self) -> BoxFuture<'_, Vec<Location>, Self::Error> {
        Box::pin(async move {
            self.record(Call::ListLocations)?;
            Ok(vec![Location {
                id: "loc-1".to_string(),
                name: "Residencial Las Palmas".to_string(),
                public_code: Some("PALMAS".to_string()),
                address: None,
            }])
        })
    }
}
