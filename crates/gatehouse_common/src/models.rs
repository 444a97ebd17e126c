// --- File: crates/gatehouse_common/src/models.rs ---

// Access-control hardware as the authority models it: locations own gates,
// gates own devices, devices carry a code/secret credential pair.

use crate::secret::DeviceSecret;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default relay output for new devices.
pub const DEFAULT_RELAY_NUMBER: u8 = 1;

/// Default relay pulse for new devices, in milliseconds.
pub const DEFAULT_PULSE_DURATION_MS: u32 = 200;

/// Highest relay output a controller exposes.
pub const MAX_RELAY_NUMBER: u8 = 4;

fn default_relay_number() -> u8 {
    DEFAULT_RELAY_NUMBER
}

fn default_pulse_duration_ms() -> u32 {
    DEFAULT_PULSE_DURATION_MS
}

fn default_true() -> bool {
    true
}

/// The authority returns ids as strings on newer endpoints and integers on
/// older ones.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "id_from_string_or_number")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

/// Timestamps arrive as RFC 3339 or as a bare `YYYY-MM-DD HH:MM:SS` in UTC.
/// Anything else reads as unknown rather than failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(text) = raw.as_str() else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Error returned when parsing an unknown enum name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// --- Devices ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Gate,
    Door,
    Parking,
    Turnstile,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Gate,
        DeviceType::Door,
        DeviceType::Parking,
        DeviceType::Turnstile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Gate => "gate",
            DeviceType::Door => "door",
            DeviceType::Parking => "parking",
            DeviceType::Turnstile => "turnstile",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "device type",
                value: s.to_string(),
            })
    }
}

/// A device as listed by the authority. Fields this client does not model are
/// kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub device_code: String,
    pub device_name: String,
    pub device_type: DeviceType,
    #[serde(default, deserialize_with = "optional_id")]
    pub gate_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub location_id: Option<String>,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_exit: bool,
    #[serde(default = "default_relay_number")]
    pub relay_number: u8,
    #[serde(default = "default_pulse_duration_ms")]
    pub pulse_duration_ms: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_ip: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Body of `POST /hardware/devices`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDevice {
    pub device_code: String,
    pub device_name: String,
    pub device_type: DeviceType,
    pub is_entry: bool,
    pub is_exit: bool,
    pub relay_number: u8,
    pub pulse_duration_ms: u32,
    pub notes: Option<String>,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_id: Option<String>,
}

/// Body of `PUT /hardware/devices/{id}`. There is deliberately no
/// `device_code`: codes are immutable once issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_entry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_duration_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl DeviceUpdate {
    /// An update that only flips the active flag.
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `data` of a successful create: the only response that carries both the
/// code and the plaintext secret.
#[derive(Debug, Deserialize)]
pub struct IssuedDevice {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub device_code: String,
    pub device_name: String,
    pub device_secret: DeviceSecret,
}

/// `data` of a successful secret regeneration.
#[derive(Debug, Deserialize)]
pub struct RegeneratedSecret {
    pub device_secret: DeviceSecret,
}

// --- Gates ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateType {
    Main,
    Vehicle,
    Pedestrian,
    Service,
    Emergency,
}

impl GateType {
    pub const ALL: [GateType; 5] = [
        GateType::Main,
        GateType::Vehicle,
        GateType::Pedestrian,
        GateType::Service,
        GateType::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GateType::Main => "main",
            GateType::Vehicle => "vehicle",
            GateType::Pedestrian => "pedestrian",
            GateType::Service => "service",
            GateType::Emergency => "emergency",
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "gate type",
                value: s.to_string(),
            })
    }
}

/// What the guard house must collect at a gate. Each toggle is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRequirements {
    #[serde(default)]
    pub requires_entry_photo: bool,
    #[serde(default)]
    pub requires_exit_photo: bool,
    #[serde(default)]
    pub requires_vehicle_photo: bool,
    #[serde(default)]
    pub requires_id_scan: bool,
    #[serde(default)]
    pub requires_companion_count: bool,
    #[serde(default)]
    pub auto_approve: bool,
    #[serde(default)]
    pub notify_resident: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    pub gate_type: GateType,
    #[serde(default)]
    pub is_checkpoint: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub location_id: Option<String>,
    #[serde(flatten)]
    pub requirements: GateRequirements,
}

/// Body of `POST /hardware/gates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGate {
    pub name: String,
    pub gate_type: GateType,
    pub is_checkpoint: bool,
    #[serde(flatten)]
    pub requirements: GateRequirements,
    pub location_id: String,
}

/// Body of `PUT /hardware/gates/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_type: Option<GateType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checkpoint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub requirements: Option<GateRequirements>,
}

impl GateUpdate {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// --- Locations ---

/// A community (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    /// Code residents type to join the community.
    #[serde(default)]
    pub public_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}
