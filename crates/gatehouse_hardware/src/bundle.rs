//! Agent configuration bundle.
//!
//! The JSON shape is a contract with the field agent: keys are camelCase and
//! the top-level order is `agent`, `locationId`, `auth`, `api`, `devices`,
//! `qrReader`, `logging`.

use crate::flow::IssuedCredential;
use gatehouse_common::DeviceSecret;
use gatehouse_config::BundleDefaults;
use serde::Serialize;
use zeroize::Zeroizing;

/// Agent configuration for one issued device.
///
/// Borrows the credential, so a bundle can never outlive the secret it embeds.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBundle<'a> {
    pub agent: AgentSection<'a>,
    pub location_id: &'a str,
    pub auth: AuthSection<'a>,
    pub api: ApiSection<'a>,
    pub devices: Vec<DeviceSection<'a>>,
    pub qr_reader: QrReaderSection<'a>,
    pub logging: LoggingSection<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AgentSection<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSection<'a> {
    pub device_code: &'a str,
    pub device_secret: &'a DeviceSecret,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSection<'a> {
    pub base_url: &'a str,
    pub poll_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSection<'a> {
    pub id: String,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub ip: &'a str,
    pub port: u16,
    pub relay: RelaySection<'a>,
    pub is_entry: bool,
    pub is_exit: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelaySection<'a> {
    pub ip: &'a str,
    pub number: u8,
    pub pulse_duration_ms: u32,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrReaderSection<'a> {
    pub enabled: bool,
    pub port: &'a str,
    pub baud_rate: u32,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSection<'a> {
    pub level: &'a str,
    pub file: &'a str,
    pub max_files: u32,
}

impl ConfigBundle<'_> {
    /// Pretty-printed JSON. The buffer is wiped when dropped since it holds
    /// the plaintext secret.
    pub fn to_json(&self) -> Result<Zeroizing<String>, serde_json::Error> {
        serde_json::to_string_pretty(self).map(Zeroizing::new)
    }

    /// File name the agent installer expects, e.g. `agent-config-GATE-AB12.json`.
    pub fn file_name(&self) -> String {
        let code: String = self
            .auth
            .device_code
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("agent-config-{}.json", code)
    }
}

/// Merges the static defaults with the issued credential. Pure.
pub fn build_config_bundle<'a>(
    credential: &'a IssuedCredential,
    location_id: &'a str,
    api_base_url: &'a str,
    defaults: &'a BundleDefaults,
) -> ConfigBundle<'a> {
    let relay = credential.relay();

    ConfigBundle {
        agent: AgentSection {
            name: credential.device_name(),
            version: &defaults.agent_version,
        },
        location_id,
        auth: AuthSection {
            device_code: credential.device_code(),
            device_secret: credential.secret(),
        },
        api: ApiSection {
            base_url: api_base_url,
            poll_interval_ms: defaults.poll_interval_ms,
            heartbeat_interval_ms: defaults.heartbeat_interval_ms,
            timeout_ms: defaults.timeout_ms,
        },
        devices: vec![DeviceSection {
            id: slugify(credential.device_name()),
            name: credential.device_name(),
            kind: &defaults.controller_kind,
            ip: &defaults.controller_ip,
            port: defaults.controller_port,
            relay: RelaySection {
                ip: &defaults.relay_board_ip,
                number: relay.relay_number,
                pulse_duration_ms: relay.pulse_duration_ms,
            },
            is_entry: relay.is_entry,
            is_exit: relay.is_exit,
        }],
        qr_reader: QrReaderSection {
            enabled: defaults.qr_reader_enabled,
            port: &defaults.qr_reader_port,
            baud_rate: defaults.qr_reader_baud_rate,
        },
        logging: LoggingSection {
            level: &defaults.log_level,
            file: &defaults.log_file,
            max_files: defaults.log_max_files,
        },
    }
}

/// Lowercase ASCII slug: `"Entrada Principal #2"` becomes `entrada-principal-2`.
/// Falls back to `device` when nothing is left.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "device".to_string()
    } else {
        slug
    }
}
