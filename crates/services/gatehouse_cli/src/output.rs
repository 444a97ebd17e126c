//! Terminal output and prompts.

use dialoguer::Confirm;
use gatehouse_common::{Device, Gate, GatehouseError, Location};
use gatehouse_hardware::{Clipboard, IssuedCredential};
use std::io::{self, Write};

/// Message shown to the operator. Authority and validation messages are
/// printed as-is, without the error-kind prefix.
pub fn operator_text(err: &GatehouseError) -> String {
    match err {
        GatehouseError::ExternalServiceError { message, .. }
        | GatehouseError::ValidationError(message)
        | GatehouseError::HttpError(message)
        | GatehouseError::NotFoundError(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Asks a yes/no question.
pub fn confirm(prompt: impl Into<String>, default: bool) -> Result<bool, GatehouseError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|err| GatehouseError::CancelledError(err.to_string()))
}

/// Prints the credential once.
pub fn print_credential(credential: &IssuedCredential) {
    println!();
    println!("  Device:  {}", credential.device_name());
    println!("  Code:    {}", credential.device_code());
    println!("  Secret:  {}", credential.secret().expose());
    println!();
    println!("  This secret is shown only once. Store it before continuing.");
    println!();
}

pub fn print_devices(devices: &[Device]) {
    if devices.is_empty() {
        println!("No devices found. Create one with: gatehouse devices create <name>");
        return;
    }
    println!(
        "{:<10} {:<12} {:<28} {:<10} {:<6} {:<7} {:<6} {}",
        "ID", "CODE", "NAME", "TYPE", "RELAY", "PULSE", "DIR", "STATUS"
    );
    for device in devices {
        let direction = match (device.is_entry, device.is_exit) {
            (true, true) => "in/out",
            (true, false) => "in",
            (false, true) => "out",
            (false, false) => "-",
        };
        println!(
            "{:<10} {:<12} {:<28} {:<10} {:<6} {:<7} {:<6} {}",
            device.id,
            device.device_code,
            device.device_name,
            device.device_type,
            device.relay_number,
            format!("{}ms", device.pulse_duration_ms),
            direction,
            if device.is_active { "active" } else { "inactive" },
        );
    }
}

pub fn print_gates(gates: &[Gate]) {
    if gates.is_empty() {
        println!("No gates found. Create one with: gatehouse gates create <name>");
        return;
    }
    println!(
        "{:<10} {:<28} {:<11} {:<11} {}",
        "ID", "NAME", "TYPE", "CHECKPOINT", "STATUS"
    );
    for gate in gates {
        println!(
            "{:<10} {:<28} {:<11} {:<11} {}",
            gate.id,
            gate.name,
            gate.gate_type,
            if gate.is_checkpoint { "yes" } else { "no" },
            if gate.is_active { "active" } else { "inactive" },
        );
    }
}

pub fn print_locations(locations: &[Location]) {
    if locations.is_empty() {
        println!("No locations found.");
        return;
    }
    println!("{:<10} {:<32} {}", "ID", "NAME", "CODE");
    for location in locations {
        println!(
            "{:<10} {:<32} {}",
            location.id,
            location.name,
            location.public_code.as_deref().unwrap_or("-")
        );
    }
}

/// Stand-in clipboard for a terminal: prints the text between markers so it
/// can be copied by hand.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn copy_text(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "----- BEGIN AGENT CONFIG -----")?;
        writeln!(stdout, "{}", text)?;
        writeln!(stdout, "----- END AGENT CONFIG -----")?;
        stdout.flush()
    }

    fn describe(&self) -> String {
        "printed to the terminal".to_string()
    }
}
