//! `gatehouse gates ...`

use crate::output::{self, confirm};
use crate::App;
use clap::{ArgAction, Subcommand, ValueEnum};
use gatehouse_common::{not_found, GateRequirements, GateType, GateUpdate, GatehouseError};
use gatehouse_hardware::{GateDraft, LocationInventory};

/// A single requirement toggle.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    EntryPhoto,
    ExitPhoto,
    VehiclePhoto,
    IdScan,
    CompanionCount,
    AutoApprove,
    NotifyResident,
}

/// Builds the toggle set; anything not listed is off.
pub fn requirements_from(selected: &[Requirement]) -> GateRequirements {
    let mut requirements = GateRequirements::default();
    for requirement in selected {
        match requirement {
            Requirement::EntryPhoto => requirements.requires_entry_photo = true,
            Requirement::ExitPhoto => requirements.requires_exit_photo = true,
            Requirement::VehiclePhoto => requirements.requires_vehicle_photo = true,
            Requirement::IdScan => requirements.requires_id_scan = true,
            Requirement::CompanionCount => requirements.requires_companion_count = true,
            Requirement::AutoApprove => requirements.auto_approve = true,
            Requirement::NotifyResident => requirements.notify_resident = true,
        }
    }
    requirements
}

#[derive(Subcommand, Clone, Debug)]
pub enum GateCommands {
    /// List gates of the location
    List,

    /// Create a gate
    Create {
        name: String,
        #[arg(long = "type", default_value = "main")]
        gate_type: GateType,
        #[arg(long)]
        checkpoint: bool,
        /// Requirement to enable; repeat for several
        #[arg(long = "require", value_enum)]
        requirements: Vec<Requirement>,
    },

    /// Change a gate
    Update {
        gate: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        gate_type: Option<GateType>,
        #[arg(long, action = ArgAction::Set)]
        checkpoint: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
        /// Replaces the whole requirement set
        #[arg(long = "require", value_enum)]
        requirements: Vec<Requirement>,
        /// Turns every requirement off
        #[arg(long, conflicts_with = "requirements")]
        clear_requirements: bool,
    },

    /// Delete a gate
    Delete {
        gate: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle(cmd: GateCommands, app: &App) -> Result<(), GatehouseError> {
    let mut inventory = LocationInventory::new(app.authority.clone(), app.location_id()?);

    match cmd {
        GateCommands::List => {
            inventory.refresh().await?;
            output::print_gates(inventory.gates());
        }

        GateCommands::Create {
            name,
            gate_type,
            checkpoint,
            requirements,
        } => {
            let mut draft = GateDraft::new(name, gate_type);
            draft.is_checkpoint = checkpoint;
            draft.requirements = requirements_from(&requirements);

            let gate = inventory.create_gate(&draft).await?;
            println!("Gate '{}' created with id {}.", gate.name, gate.id);
        }

        GateCommands::Update {
            gate,
            name,
            gate_type,
            checkpoint,
            active,
            requirements,
            clear_requirements,
        } => {
            let update = GateUpdate {
                name,
                gate_type,
                is_checkpoint: checkpoint,
                is_active: active,
                requirements: (clear_requirements || !requirements.is_empty())
                    .then(|| requirements_from(&requirements)),
            };
            inventory.update_gate(&gate, &update).await?;
            println!("Gate {} updated.", gate);
        }

        GateCommands::Delete { gate, yes } => {
            inventory.refresh().await?;
            let target = inventory
                .find_gate(&gate)
                .cloned()
                .ok_or_else(|| not_found(format!("Gate '{}' not found", gate)))?;

            if !yes
                && !confirm(
                    format!(
                        "Delete gate '{}'? Devices attached to it stop opening it. This cannot be undone.",
                        target.name
                    ),
                    false,
                )?
            {
                println!("Operation cancelled");
                return Ok(());
            }

            inventory.delete_gate(&target.id).await?;
            println!("Gate '{}' deleted.", target.name);
        }
    }

    Ok(())
}
