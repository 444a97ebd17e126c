//! Handing a bundle to the operator.
//!
//! The bundle is written to a temporary file that only lives for the duration
//! of the share call. When there is no share target, or sharing fails, the
//! JSON goes to the clipboard instead and the outcome says which path was
//! taken.

use crate::bundle::ConfigBundle;
use crate::error::HardwareError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Somewhere a bundle file can be sent (a directory, a share sheet, ...).
pub trait ShareTarget {
    /// Takes `file` while it exists and returns a description of where it went.
    fn share(&self, file: &Path, file_name: &str) -> io::Result<String>;
}

/// Fallback surface for the bundle as plain text.
pub trait Clipboard {
    fn copy_text(&self, text: &str) -> io::Result<()>;

    /// How the operator is told the text went here, e.g. "copied to the clipboard".
    fn describe(&self) -> String {
        "copied to the clipboard".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Shared { destination: String },
    /// The text went to the clipboard fallback, described by `via`.
    /// `share_error` is set when a share target existed but failed.
    Fallback {
        via: String,
        share_error: Option<String>,
    },
}

impl ExportOutcome {
    /// What to tell the operator.
    pub fn describe(&self) -> String {
        match self {
            ExportOutcome::Shared { destination } => {
                format!("Configuration shared to {}", destination)
            }
            ExportOutcome::Fallback {
                via,
                share_error: None,
            } => format!(
                "Sharing is not available; the configuration was {} instead.",
                via
            ),
            ExportOutcome::Fallback {
                via,
                share_error: Some(err),
            } => format!(
                "Sharing failed ({}); the configuration was {} instead.",
                err, via
            ),
        }
    }
}

/// Exports `bundle` through `share`, falling back to `clipboard`.
pub fn export_config_bundle(
    bundle: &ConfigBundle<'_>,
    share: Option<&dyn ShareTarget>,
    clipboard: &dyn Clipboard,
) -> Result<ExportOutcome, HardwareError> {
    let json = bundle
        .to_json()
        .map_err(|err| HardwareError::Export(format!("could not serialize bundle: {}", err)))?;

    let share_error = match share {
        Some(target) => match share_via_temp_file(target, json.as_bytes(), &bundle.file_name()) {
            Ok(destination) => {
                info!(%destination, "config bundle shared");
                return Ok(ExportOutcome::Shared { destination });
            }
            Err(err) => {
                warn!(error = %err, "sharing config bundle failed, falling back to clipboard");
                Some(err.to_string())
            }
        },
        None => None,
    };

    clipboard
        .copy_text(&json)
        .map_err(|err| HardwareError::Export(format!("clipboard unavailable: {}", err)))?;
    let via = clipboard.describe();
    info!(%via, "config bundle handed to clipboard fallback");
    Ok(ExportOutcome::Fallback { via, share_error })
}

fn share_via_temp_file(
    target: &dyn ShareTarget,
    contents: &[u8],
    file_name: &str,
) -> io::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("agent-config-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(contents)?;
    file.flush()?;

    let result = target.share(file.path(), file_name);
    file.close()?;
    result
}

/// Copies the bundle file into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryShare {
    dir: PathBuf,
}

impl DirectoryShare {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ShareTarget for DirectoryShare {
    fn share(&self, file: &Path, file_name: &str) -> io::Result<String> {
        if !self.dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.dir.display()),
            ));
        }
        let destination = self.dir.join(file_name);
        fs::copy(file, &destination)?;
        Ok(destination.display().to_string())
    }
}
