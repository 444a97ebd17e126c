//! Device credential issuance flow.
//!
//! ```text
//!   Idle ──submit──▶ Submitting ──ok──▶ Issued ──dismiss──▶ Idle
//!                        │
//!                        └──error / dropped──▶ Idle
//! ```
//!
//! Only one submission may be in flight per flow; a second one gets
//! [`HardwareError::Busy`]. The issued secret lives only inside the flow state
//! and is zeroed when the operator dismisses it, when a new submission starts,
//! or when the flow is dropped.

use crate::bundle::{build_config_bundle, ConfigBundle};
use crate::device_code::generate_device_code;
use crate::error::{validation, HardwareError};
use gatehouse_common::models::{
    DEFAULT_PULSE_DURATION_MS, DEFAULT_RELAY_NUMBER, MAX_RELAY_NUMBER,
};
use gatehouse_common::{Device, DeviceSecret, DeviceType, HardwareAuthority, IssuedDevice, NewDevice};
use gatehouse_config::BundleDefaults;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// What the operator fills in to create a device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDraft {
    pub device_name: String,
    pub device_code: String,
    pub device_type: DeviceType,
    pub is_entry: bool,
    pub is_exit: bool,
    pub relay_number: u8,
    pub pulse_duration_ms: u32,
    pub notes: Option<String>,
    pub gate_id: Option<String>,
}

impl DeviceDraft {
    /// An entry device on relay 1 with a 200 ms pulse and a suggested code.
    pub fn new(device_name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            device_name: device_name.into(),
            device_code: generate_device_code(device_type),
            device_type,
            is_entry: true,
            is_exit: false,
            relay_number: DEFAULT_RELAY_NUMBER,
            pulse_duration_ms: DEFAULT_PULSE_DURATION_MS,
            notes: None,
            gate_id: None,
        }
    }

    pub fn with_code(mut self, device_code: impl Into<String>) -> Self {
        self.device_code = device_code.into();
        self
    }

    /// Replaces the code with a fresh suggestion, typically after the
    /// authority rejected the previous one as a duplicate.
    pub fn suggest_new_code(&mut self) -> &str {
        self.device_code = generate_device_code(self.device_type);
        &self.device_code
    }

    /// Checks the draft and builds the request body for `location_id`.
    pub fn to_request(&self, location_id: &str) -> Result<NewDevice, HardwareError> {
        let device_name = self.device_name.trim();
        if device_name.is_empty() {
            return Err(validation("Device name is required"));
        }
        let device_code = self.device_code.trim();
        if device_code.is_empty() {
            return Err(validation("Device code is required"));
        }
        validate_relay(self.relay_number, self.pulse_duration_ms)?;
        let location_id = location_id.trim();
        if location_id.is_empty() {
            return Err(validation("A location must be selected"));
        }

        Ok(NewDevice {
            device_code: device_code.to_string(),
            device_name: device_name.to_string(),
            device_type: self.device_type,
            is_entry: self.is_entry,
            is_exit: self.is_exit,
            relay_number: self.relay_number,
            pulse_duration_ms: self.pulse_duration_ms,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
            location_id: location_id.to_string(),
            gate_id: self.gate_id.clone(),
        })
    }
}

pub(crate) fn validate_relay(relay_number: u8, pulse_duration_ms: u32) -> Result<(), HardwareError> {
    if !(1..=MAX_RELAY_NUMBER).contains(&relay_number) {
        return Err(validation(format!(
            "Relay number must be between 1 and {}",
            MAX_RELAY_NUMBER
        )));
    }
    if pulse_duration_ms == 0 {
        return Err(validation("Pulse duration must be greater than zero"));
    }
    Ok(())
}

/// Relay wiring of an issued device, copied into the agent bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub relay_number: u8,
    pub pulse_duration_ms: u32,
    pub is_entry: bool,
    pub is_exit: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            relay_number: DEFAULT_RELAY_NUMBER,
            pulse_duration_ms: DEFAULT_PULSE_DURATION_MS,
            is_entry: true,
            is_exit: false,
        }
    }
}

impl From<&Device> for RelaySettings {
    fn from(device: &Device) -> Self {
        Self {
            relay_number: device.relay_number,
            pulse_duration_ms: device.pulse_duration_ms,
            is_entry: device.is_entry,
            is_exit: device.is_exit,
        }
    }
}

impl From<&NewDevice> for RelaySettings {
    fn from(device: &NewDevice) -> Self {
        Self {
            relay_number: device.relay_number,
            pulse_duration_ms: device.pulse_duration_ms,
            is_entry: device.is_entry,
            is_exit: device.is_exit,
        }
    }
}

/// A device identity together with its one-time secret.
///
/// Not `Clone`: there is exactly one owner of the plaintext.
#[derive(Debug)]
pub struct IssuedCredential {
    device_id: String,
    device_code: String,
    device_name: String,
    relay: RelaySettings,
    secret: DeviceSecret,
}

impl IssuedCredential {
    pub fn new(
        device_id: impl Into<String>,
        device_code: impl Into<String>,
        device_name: impl Into<String>,
        relay: RelaySettings,
        secret: DeviceSecret,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            device_code: device_code.into(),
            device_name: device_name.into(),
            relay,
            secret,
        }
    }

    fn from_issued(issued: IssuedDevice, relay: RelaySettings) -> Self {
        Self::new(
            issued.id,
            issued.device_code,
            issued.device_name,
            relay,
            issued.device_secret,
        )
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_code(&self) -> &str {
        &self.device_code
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn relay(&self) -> RelaySettings {
        self.relay
    }

    pub fn secret(&self) -> &DeviceSecret {
        &self.secret
    }

    fn receipt(&self) -> IssueReceipt {
        IssueReceipt {
            device_id: self.device_id.clone(),
            device_code: self.device_code.clone(),
            device_name: self.device_name.clone(),
        }
    }
}

/// The non-secret part of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReceipt {
    pub device_id: String,
    pub device_code: String,
    pub device_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Submitting,
    Issued,
}

#[derive(Debug)]
enum FlowState {
    Idle,
    Submitting,
    Issued(IssuedCredential),
}

impl FlowState {
    fn phase(&self) -> FlowPhase {
        match self {
            FlowState::Idle => FlowPhase::Idle,
            FlowState::Submitting => FlowPhase::Submitting,
            FlowState::Issued(_) => FlowPhase::Issued,
        }
    }
}

fn lock(state: &Mutex<FlowState>) -> MutexGuard<'_, FlowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks the flow as Submitting for as long as it lives.
///
/// Dropping it without [`Submission::complete`] (error, or the caller
/// abandoning the future) puts the flow back to Idle.
struct Submission<'a> {
    state: &'a Mutex<FlowState>,
    completed: bool,
}

impl Submission<'_> {
    fn complete(mut self, credential: IssuedCredential) -> IssueReceipt {
        let receipt = credential.receipt();
        *lock(self.state) = FlowState::Issued(credential);
        self.completed = true;
        receipt
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut state = lock(self.state);
        if matches!(*state, FlowState::Submitting) {
            *state = FlowState::Idle;
        }
    }
}

/// Issues and rotates device credentials for one location.
pub struct IssuanceFlow<A> {
    authority: Arc<A>,
    location_id: String,
    state: Mutex<FlowState>,
}

impl<A> IssuanceFlow<A>
where
    A: HardwareAuthority<Error = HardwareError>,
{
    pub fn new(authority: Arc<A>, location_id: impl Into<String>) -> Self {
        Self {
            authority,
            location_id: location_id.into(),
            state: Mutex::new(FlowState::Idle),
        }
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn phase(&self) -> FlowPhase {
        lock(&self.state).phase()
    }

    fn begin(&self) -> Result<Submission<'_>, HardwareError> {
        let mut state = lock(&self.state);
        if matches!(*state, FlowState::Submitting) {
            return Err(HardwareError::Busy);
        }
        // an undismissed credential is discarded (and zeroed) here
        *state = FlowState::Submitting;
        Ok(Submission {
            state: &self.state,
            completed: false,
        })
    }

    /// Creates a device. Validation happens before anything is sent.
    pub async fn issue_device(&self, draft: &DeviceDraft) -> Result<IssueReceipt, HardwareError> {
        let request = draft.to_request(&self.location_id)?;
        let submission = self.begin()?;

        match self.authority.create_device(&request).await {
            Ok(issued) => {
                let credential = IssuedCredential::from_issued(issued, RelaySettings::from(&request));
                let receipt = submission.complete(credential);
                info!(
                    device_id = %receipt.device_id,
                    device_code = %receipt.device_code,
                    "device issued"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(device_code = %request.device_code, error = %err, "device issuance failed");
                Err(err)
            }
        }
    }

    /// Rotates `device`'s secret. The old secret must be considered revoked as
    /// soon as this is called, whatever the outcome.
    pub async fn regenerate_secret(&self, device: &Device) -> Result<IssueReceipt, HardwareError> {
        let submission = self.begin()?;

        match self.authority.regenerate_secret(&device.id).await {
            Ok(secret) => {
                let credential = IssuedCredential::new(
                    device.id.clone(),
                    device.device_code.clone(),
                    device.device_name.clone(),
                    RelaySettings::from(device),
                    secret,
                );
                let receipt = submission.complete(credential);
                info!(device_id = %receipt.device_id, "device secret regenerated");
                Ok(receipt)
            }
            Err(err) => {
                warn!(device_id = %device.id, error = %err, "secret regeneration failed");
                Err(err)
            }
        }
    }

    /// Runs `f` against the issued credential, if there is one.
    ///
    /// The borrow cannot escape `f`, so the plaintext never leaves the flow.
    pub fn reveal<R>(&self, f: impl FnOnce(&IssuedCredential) -> R) -> Option<R> {
        match &*lock(&self.state) {
            FlowState::Issued(credential) => Some(f(credential)),
            _ => None,
        }
    }

    /// Builds the agent bundle for the issued credential and hands it to `f`.
    pub fn with_config_bundle<R>(
        &self,
        api_base_url: &str,
        defaults: &BundleDefaults,
        f: impl FnOnce(&ConfigBundle<'_>) -> R,
    ) -> Result<R, HardwareError> {
        let location_id = self.location_id.as_str();
        self.reveal(|credential| {
            let bundle = build_config_bundle(credential, location_id, api_base_url, defaults);
            f(&bundle)
        })
        .ok_or(HardwareError::NothingIssued)
    }

    /// The operator has saved the secret: drop it. Returns whether a secret
    /// was held. There is no way back.
    pub fn dismiss(&self) -> bool {
        let mut state = lock(&self.state);
        if matches!(*state, FlowState::Issued(_)) {
            *state = FlowState::Idle;
            info!("issued secret dismissed");
            true
        } else {
            false
        }
    }
}
