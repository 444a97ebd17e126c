use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod env_vars;
pub mod models;
pub mod session;

pub use models::*;
pub use session::{load_session, Role, Session, SessionError};

/// Loads configuration from `GATEHOUSE_CONFIG_DIR` (default `config`) for the
/// environment named by `RUN_ENV` (default `debug`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir =
        PathBuf::from(env::var("GATEHOUSE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    load_config_from(&config_dir, &run_env)
}

/// Layers `<dir>/default`, `<dir>/<run_env>` and `GATEHOUSE__*` environment
/// variables, then resolves `secret_from_env` markers.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let prefix = env_vars::CONFIG_PREFIX;
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    debug!(
        default_path = %default_path.display(),
        env_path = %env_path.display(),
        "loading configuration"
    );

    let builder = Config::builder()
        .add_source(File::from(default_path.as_path()).required(false))
        .add_source(File::from(env_path.as_path()).required(false))
        .add_source(Environment::with_prefix(prefix).separator(env_vars::CONFIG_SEPARATOR));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Replaces all "secret_from_env" markers in the config with environment values.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    env_vars::inject_env_vars(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was used.
///
/// `DOTENV_OVERRIDE` wins over `.env`. A missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = dotenv_path(env::var("DOTENV_OVERRIDE").ok());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

fn dotenv_path(override_path: Option<String>) -> String {
    override_path
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| ".env".to_string())
}
