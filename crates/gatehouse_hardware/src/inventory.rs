//! Devices and gates of one location.
//!
//! The lists are never patched locally: every mutation is followed by a full
//! refetch from the authority. Issuance and regeneration go through an
//! [`IssuanceFlow`] but are refetched here as well.

use crate::error::{validation, HardwareError};
use crate::flow::{validate_relay, DeviceDraft, IssuanceFlow, IssueReceipt};
use gatehouse_common::{
    Device, DeviceUpdate, Gate, GateRequirements, GateType, GateUpdate, HardwareAuthority, NewGate,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the operator fills in to create a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDraft {
    pub name: String,
    pub gate_type: GateType,
    pub is_checkpoint: bool,
    pub requirements: GateRequirements,
}

impl GateDraft {
    pub fn new(name: impl Into<String>, gate_type: GateType) -> Self {
        Self {
            name: name.into(),
            gate_type,
            is_checkpoint: false,
            requirements: GateRequirements::default(),
        }
    }

    fn to_request(&self, location_id: &str) -> Result<NewGate, HardwareError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(validation("Gate name is required"));
        }
        Ok(NewGate {
            name: name.to_string(),
            gate_type: self.gate_type,
            is_checkpoint: self.is_checkpoint,
            requirements: self.requirements,
            location_id: location_id.to_string(),
        })
    }
}

fn check_device_update(update: &DeviceUpdate) -> Result<(), HardwareError> {
    if update.is_empty() {
        return Err(validation("Nothing to update"));
    }
    if update
        .device_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(validation("Device name is required"));
    }
    if update.relay_number.is_some() || update.pulse_duration_ms.is_some() {
        validate_relay(
            update.relay_number.unwrap_or(1),
            update.pulse_duration_ms.unwrap_or(1),
        )?;
    }
    Ok(())
}

fn check_gate_update(update: &GateUpdate) -> Result<(), HardwareError> {
    if update.is_empty() {
        return Err(validation("Nothing to update"));
    }
    if update
        .name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(validation("Gate name is required"));
    }
    Ok(())
}

pub struct LocationInventory<A> {
    authority: Arc<A>,
    location_id: String,
    devices: Vec<Device>,
    gates: Vec<Gate>,
}

impl<A> LocationInventory<A>
where
    A: HardwareAuthority<Error = HardwareError>,
{
    /// An empty inventory; call [`LocationInventory::refresh`] to load it.
    pub fn new(authority: Arc<A>, location_id: impl Into<String>) -> Self {
        Self {
            authority,
            location_id: location_id.into(),
            devices: Vec::new(),
            gates: Vec::new(),
        }
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Looks a device up by id or by code.
    pub fn find_device(&self, key: &str) -> Option<&Device> {
        let key = key.trim();
        self.devices
            .iter()
            .find(|device| device.id == key)
            .or_else(|| {
                self.devices
                    .iter()
                    .find(|device| device.device_code.eq_ignore_ascii_case(key))
            })
    }

    pub fn find_gate(&self, id: &str) -> Option<&Gate> {
        let id = id.trim();
        self.gates.iter().find(|gate| gate.id == id)
    }

    /// Replaces both lists with what the authority holds now.
    pub async fn refresh(&mut self) -> Result<(), HardwareError> {
        let devices = self.authority.list_devices(&self.location_id).await?;
        let gates = self.authority.list_gates(&self.location_id).await?;
        debug!(
            location_id = %self.location_id,
            devices = devices.len(),
            gates = gates.len(),
            "inventory refreshed"
        );
        self.devices = devices;
        self.gates = gates;
        Ok(())
    }

    /// Issues a device through `flow` and refetches. The credential stays in
    /// the flow; a failed refetch is logged so it cannot cost the operator the
    /// one-time reveal.
    pub async fn issue_device(
        &mut self,
        flow: &IssuanceFlow<A>,
        draft: &DeviceDraft,
    ) -> Result<IssueReceipt, HardwareError> {
        let receipt = flow.issue_device(draft).await?;
        self.refresh_after_issue().await;
        Ok(receipt)
    }

    /// Regenerates the secret of `device_id` through `flow` and refetches.
    /// The device must be in the current listing.
    pub async fn regenerate_secret(
        &mut self,
        flow: &IssuanceFlow<A>,
        device_id: &str,
    ) -> Result<IssueReceipt, HardwareError> {
        let device = self
            .find_device(device_id)
            .cloned()
            .ok_or_else(|| validation(format!("Device '{}' not found", device_id)))?;
        let receipt = flow.regenerate_secret(&device).await?;
        self.refresh_after_issue().await;
        Ok(receipt)
    }

    async fn refresh_after_issue(&mut self) {
        if let Err(err) = self.refresh().await {
            warn!(location_id = %self.location_id, error = %err, "could not refresh inventory");
        }
    }

    pub async fn update_device(
        &mut self,
        device_id: &str,
        update: &DeviceUpdate,
    ) -> Result<(), HardwareError> {
        check_device_update(update)?;
        self.authority.update_device(device_id, update).await?;
        info!(device_id, "device updated");
        self.refresh().await
    }

    pub async fn set_device_active(
        &mut self,
        device_id: &str,
        is_active: bool,
    ) -> Result<(), HardwareError> {
        self.authority
            .update_device(device_id, &DeviceUpdate::active(is_active))
            .await?;
        info!(device_id, is_active, "device activation changed");
        self.refresh().await
    }

    /// Irreversible. Callers confirm with the operator first.
    pub async fn delete_device(&mut self, device_id: &str) -> Result<(), HardwareError> {
        self.authority.delete_device(device_id).await?;
        info!(device_id, "device deleted");
        self.refresh().await
    }

    /// Creates a gate and returns it as the authority stored it.
    pub async fn create_gate(&mut self, draft: &GateDraft) -> Result<Gate, HardwareError> {
        let request = draft.to_request(&self.location_id)?;
        let gate = self.authority.create_gate(&request).await?;
        info!(gate_id = %gate.id, name = %gate.name, "gate created");
        self.refresh().await?;
        Ok(gate)
    }

    pub async fn update_gate(
        &mut self,
        gate_id: &str,
        update: &GateUpdate,
    ) -> Result<(), HardwareError> {
        check_gate_update(update)?;
        self.authority.update_gate(gate_id, update).await?;
        info!(gate_id, "gate updated");
        self.refresh().await
    }

    pub async fn set_gate_active(
        &mut self,
        gate_id: &str,
        is_active: bool,
    ) -> Result<(), HardwareError> {
        self.authority
            .update_gate(gate_id, &GateUpdate::active(is_active))
            .await?;
        info!(gate_id, is_active, "gate activation changed");
        self.refresh().await
    }

    /// Irreversible. Callers confirm with the operator first.
    pub async fn delete_gate(&mut self, gate_id: &str) -> Result<(), HardwareError> {
        self.authority.delete_gate(gate_id).await?;
        info!(gate_id, "gate deleted");
        self.refresh().await
    }
}
