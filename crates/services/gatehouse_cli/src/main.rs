// File: services/gatehouse_cli/src/main.rs
use clap::{Parser, Subcommand};
use gatehouse_common::{config_error, logging, Context, DeviceType, ExitStatus, GatehouseError};
use gatehouse_config::{load_config, load_session, AppConfig, Session};
use gatehouse_hardware::{generate_device_code, resolve_location, HardwareClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

mod devices;
mod gates;
mod output;

#[derive(Parser, Debug)]
#[command(
    name = "gatehouse",
    version,
    about = "Provision gate controllers, readers and their one-time credentials"
)]
struct Cli {
    /// Location to act on (super-admins only; others use their session's)
    #[arg(long, global = true, env = "GATEHOUSE_LOCATION")]
    location: Option<String>,

    /// Dotenv file to load instead of `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage access-control devices
    #[command(subcommand)]
    Devices(devices::DeviceCommands),

    /// Manage gates
    #[command(subcommand)]
    Gates(gates::GateCommands),

    /// Browse locations
    #[command(subcommand)]
    Locations(LocationCommands),

    /// Device code helpers
    #[command(subcommand)]
    Code(CodeCommands),
}

#[derive(Subcommand, Debug)]
enum LocationCommands {
    /// List all locations (super-admins only)
    List,
}

#[derive(Subcommand, Debug)]
enum CodeCommands {
    /// Print a suggested device code
    Suggest {
        #[arg(long = "type", default_value = "gate")]
        device_type: DeviceType,
    },
}

/// Everything a command needs to talk to the authority.
pub struct App {
    pub config: AppConfig,
    pub session: Session,
    pub authority: Arc<HardwareClient>,
    requested_location: Option<String>,
}

impl App {
    pub fn location_id(&self) -> Result<String, GatehouseError> {
        Ok(resolve_location(
            &self.session,
            self.requested_location.as_deref(),
        )?)
    }
}

fn main() {
    let cli = Cli::parse();
    if let Some(path) = &cli.env_file {
        std::env::set_var("DOTENV_OVERRIDE", path);
    }

    let code = match start(cli) {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {}", output::operator_text(&err));
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn start(cli: Cli) -> Result<(), GatehouseError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<(), GatehouseError> {
    let config = load_config().map_err(config_error)?;
    logging::init_from_config(&config.logging);

    if let Commands::Code(CodeCommands::Suggest { device_type }) = &cli.command {
        println!("{}", generate_device_code(*device_type));
        return Ok(());
    }

    let session = load_session(&config)?;
    let authority = Arc::new(HardwareClient::from_config(&config, &session)?);
    let app = App {
        config,
        session,
        authority,
        requested_location: cli.location,
    };

    match cli.command {
        Commands::Devices(cmd) => devices::handle(cmd, &app).await,
        Commands::Gates(cmd) => gates::handle(cmd, &app).await,
        Commands::Locations(LocationCommands::List) => {
            let locations =
                gatehouse_hardware::list_locations(app.authority.as_ref(), &app.session).await?;
            output::print_locations(&locations);
            Ok(())
        }
        Commands::Code(_) => Ok(()),
    }
}
