//! `gatehouse devices ...`

use crate::output::{self, confirm, TerminalClipboard};
use crate::App;
use clap::{ArgAction, Args, Subcommand};
use gatehouse_common::{not_found, validation_error, DeviceType, DeviceUpdate, GatehouseError};
use gatehouse_hardware::{
    export_config_bundle, DeviceDraft, DirectoryShare, HardwareClient, HardwareError,
    IssuanceFlow, LocationInventory, ShareTarget,
};
use std::path::PathBuf;

#[derive(Subcommand, Clone, Debug)]
pub enum DeviceCommands {
    /// List devices of the location
    List,

    /// Create a device and show its secret once
    Create {
        /// Display name, e.g. "Entrada Principal"
        name: String,
        #[arg(long = "type", default_value = "gate")]
        device_type: DeviceType,
        /// Device code; a suggestion is generated when omitted
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value_t = 1)]
        relay: u8,
        #[arg(long, default_value_t = 200)]
        pulse_ms: u32,
        /// Opens on exit instead of entry
        #[arg(long)]
        exit: bool,
        /// Opens on both entry and exit
        #[arg(long, conflicts_with = "exit")]
        both: bool,
        #[arg(long)]
        gate: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        reveal: RevealArgs,
    },

    /// Change a device's settings (the code cannot be changed)
    Update {
        /// Device id or code
        device: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        device_type: Option<DeviceType>,
        #[arg(long)]
        relay: Option<u8>,
        #[arg(long)]
        pulse_ms: Option<u32>,
        #[arg(long, action = ArgAction::Set)]
        entry: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        exit: Option<bool>,
        #[arg(long)]
        gate: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Allow the device to authenticate again
    Activate { device: String },

    /// Stop the device from authenticating
    Deactivate { device: String },

    /// Replace a device's secret; the current one stops working
    Regenerate {
        /// Device id or code
        device: String,
        #[command(flatten)]
        reveal: RevealArgs,
    },

    /// Delete a device
    Delete {
        /// Device id or code
        device: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// What to do with a freshly issued secret.
#[derive(Args, Clone, Debug)]
pub struct RevealArgs {
    /// Write the agent configuration into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Print the agent configuration to the terminal
    #[arg(long)]
    print_bundle: bool,
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

pub async fn handle(cmd: DeviceCommands, app: &App) -> Result<(), GatehouseError> {
    let location_id = app.location_id()?;
    let mut inventory = LocationInventory::new(app.authority.clone(), location_id.clone());

    match cmd {
        DeviceCommands::List => {
            inventory.refresh().await?;
            output::print_devices(inventory.devices());
        }

        DeviceCommands::Create {
            name,
            device_type,
            code,
            relay,
            pulse_ms,
            exit,
            both,
            gate,
            notes,
            reveal,
        } => {
            let code_was_suggested = code.is_none();
            let mut draft = DeviceDraft::new(name, device_type);
            if let Some(code) = code {
                draft = draft.with_code(code);
            }
            draft.relay_number = relay;
            draft.pulse_duration_ms = pulse_ms;
            draft.is_entry = !exit;
            draft.is_exit = exit || both;
            draft.gate_id = gate;
            draft.notes = notes;

            let flow = IssuanceFlow::new(app.authority.clone(), location_id);
            loop {
                println!("Creating device '{}' with code {}...", draft.device_name, draft.device_code);
                let result = inventory.issue_device(&flow, &draft).await;
                match result {
                    Ok(_) => break,
                    Err(err @ HardwareError::Rejected { .. })
                        if code_was_suggested && !reveal.yes =>
                    {
                        eprintln!("{}", err.operator_message());
                        if !confirm("Try again with a new suggested code?", true)? {
                            return Err(err.into());
                        }
                        draft.suggest_new_code();
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            present_secret(&flow, app, &reveal)?;
        }

        DeviceCommands::Update {
            device,
            name,
            device_type,
            relay,
            pulse_ms,
            entry,
            exit,
            gate,
            notes,
        } => {
            inventory.refresh().await?;
            let device_id = find_id(&inventory, &device)?;
            let update = DeviceUpdate {
                device_name: name,
                device_type,
                is_entry: entry,
                is_exit: exit,
                relay_number: relay,
                pulse_duration_ms: pulse_ms,
                notes,
                gate_id: gate,
                is_active: None,
            };
            if update.is_empty() {
                return Err(validation_error("Nothing to update"));
            }
            inventory.update_device(&device_id, &update).await?;
            println!("Device {} updated.", device);
        }

        DeviceCommands::Activate { device } => set_active(&mut inventory, &device, true).await?,
        DeviceCommands::Deactivate { device } => {
            set_active(&mut inventory, &device, false).await?
        }

        DeviceCommands::Regenerate { device, reveal } => {
            inventory.refresh().await?;
            let target = inventory
                .find_device(&device)
                .cloned()
                .ok_or_else(|| not_found(format!("Device '{}' not found", device)))?;

            if !reveal.yes
                && !confirm(
                    format!(
                        "Regenerating the secret of '{}' ({}) disconnects the device until it is reconfigured. Continue?",
                        target.device_name, target.device_code
                    ),
                    false,
                )?
            {
                println!("Operation cancelled");
                return Ok(());
            }

            let flow = IssuanceFlow::new(app.authority.clone(), location_id);
            inventory.regenerate_secret(&flow, &target.id).await?;
            present_secret(&flow, app, &reveal)?;
        }

        DeviceCommands::Delete { device, yes } => {
            inventory.refresh().await?;
            let target = inventory
                .find_device(&device)
                .cloned()
                .ok_or_else(|| not_found(format!("Device '{}' not found", device)))?;

            if !yes
                && !confirm(
                    format!(
                        "Delete device '{}' ({})? This cannot be undone.",
                        target.device_name, target.device_code
                    ),
                    false,
                )?
            {
                println!("Operation cancelled");
                return Ok(());
            }

            inventory.delete_device(&target.id).await?;
            println!("Device {} deleted.", target.device_code);
        }
    }

    Ok(())
}

async fn set_active(
    inventory: &mut LocationInventory<HardwareClient>,
    device: &str,
    is_active: bool,
) -> Result<(), GatehouseError> {
    inventory.refresh().await?;
    let device_id = find_id(inventory, device)?;
    inventory.set_device_active(&device_id, is_active).await?;
    println!(
        "Device {} {}.",
        device,
        if is_active { "activated" } else { "deactivated" }
    );
    Ok(())
}

fn find_id(
    inventory: &LocationInventory<HardwareClient>,
    device: &str,
) -> Result<String, GatehouseError> {
    inventory
        .find_device(device)
        .map(|found| found.id.clone())
        .ok_or_else(|| not_found(format!("Device '{}' not found", device)))
}

/// Shows the secret, optionally exports the bundle, waits for the operator to
/// confirm it was saved, then discards it.
fn present_secret(
    flow: &IssuanceFlow<HardwareClient>,
    app: &App,
    reveal: &RevealArgs,
) -> Result<(), GatehouseError> {
    flow.reveal(output::print_credential);

    if reveal.export_dir.is_some() || reveal.print_bundle {
        let share = reveal.export_dir.as_ref().map(DirectoryShare::new);
        let outcome = flow.with_config_bundle(
            app.config.agent_api_base_url(),
            &app.config.bundle,
            |bundle| {
                export_config_bundle(
                    bundle,
                    share.as_ref().map(|target| target as &dyn ShareTarget),
                    &TerminalClipboard,
                )
            },
        )??;
        println!("{}", outcome.describe());
    }

    if !reveal.yes {
        while !confirm("Have you saved the device secret? It cannot be shown again.", false)? {
            println!("Store the secret first; it is discarded once you confirm.");
        }
    }

    flow.dismiss();
    Ok(())
}
