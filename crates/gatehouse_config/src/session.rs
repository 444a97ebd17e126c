//! Persisted operator session.
//!
//! The session file is written by the login flow of the resident app and holds
//! the bearer token used for every authority request, the operator's role and
//! the location the operator belongs to.

use crate::env_vars::SECRET_MARKER;
use crate::AppConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No session token found; log in first or set GATEHOUSE_SECRET_API_TOKEN")]
    MissingToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May act on any location.
    SuperAdmin,
    /// Community administrator, pinned to one location.
    #[default]
    Admin,
    /// Guard-house staff, pinned to one location.
    Guard,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub location_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, location_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
            location_id,
        }
    }

    /// Only super-admins may pick a location other than their own.
    pub fn can_select_location(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .field("location_id", &self.location_id)
            .finish()
    }
}

/// Loads the session named by `config.session.path`.
///
/// A configured `api.token` overrides the stored token; if there is no session
/// file, the configured token alone yields an `Admin` session with no location.
pub fn load_session(config: &AppConfig) -> Result<Session, SessionError> {
    let override_token = config
        .api
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != SECRET_MARKER)
        .map(str::to_string);

    let path = Path::new(&config.session.path);
    let stored = if path.exists() {
        Some(read_session_file(path)?)
    } else {
        debug!(path = %path.display(), "no session file present");
        None
    };

    let session = match (stored, override_token) {
        (Some(mut session), Some(token)) => {
            session.token = token;
            session
        }
        (Some(session), None) => session,
        (None, Some(token)) => Session::new(token, Role::default(), None),
        (None, None) => return Err(SessionError::MissingToken),
    };

    if session.token.trim().is_empty() {
        return Err(SessionError::MissingToken);
    }
    Ok(session)
}

fn read_session_file(path: &Path) -> Result<Session, SessionError> {
    let raw = fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SessionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
