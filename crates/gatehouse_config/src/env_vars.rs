//! Environment variable naming for Gatehouse configuration.
//!
//! Plain settings are read by the `config` crate as `GATEHOUSE__SECTION__KEY`.
//! Secrets never live in config files: a value of `"secret_from_env"` is
//! swapped at load time for `GATEHOUSE_SECRET_SECTION_KEY`, or the older
//! unprefixed `SECTION_KEY`.

use serde_json::Value;
use std::env;
use tracing::{debug, warn};

pub const CONFIG_PREFIX: &str = "GATEHOUSE";
pub const SECRET_PREFIX: &str = "GATEHOUSE_SECRET";

/// Separator between prefix, sections and keys for plain settings.
pub const CONFIG_SEPARATOR: &str = "__";

/// Config value that stands for "read this from the environment".
pub const SECRET_MARKER: &str = "secret_from_env";

const SECRET_WORDS: [&str; 4] = ["secret", "key", "password", "token"];

/// `"api.base_url"` -> `"GATEHOUSE__API__BASE_URL"`.
pub fn config_var_name(path: &str) -> String {
    std::iter::once(CONFIG_PREFIX)
        .chain(path.split('.'))
        .collect::<Vec<_>>()
        .join(CONFIG_SEPARATOR)
        .to_uppercase()
}

/// `"api.token"` -> `"GATEHOUSE_SECRET_API_TOKEN"`.
pub fn secret_var_name(path: &str) -> String {
    format!("{}_{}", SECRET_PREFIX, legacy_secret_var_name(path))
}

/// `"api.token"` -> `"API_TOKEN"`.
pub fn legacy_secret_var_name(path: &str) -> String {
    path.replace('.', "_").to_uppercase()
}

/// Whether the last segment of `path` names something sensitive.
pub fn is_secret_path(path: &str) -> bool {
    let leaf = path.rsplit('.').next().unwrap_or(path).to_lowercase();
    SECRET_WORDS.iter().any(|word| leaf.contains(word))
}

/// The environment value for a config path, using the secret naming scheme
/// for sensitive paths.
pub fn lookup(path: &str) -> Option<String> {
    if is_secret_path(path) {
        env::var(secret_var_name(path))
            .or_else(|_| env::var(legacy_secret_var_name(path)))
            .ok()
    } else {
        env::var(config_var_name(path)).ok()
    }
}

/// Swaps every `"secret_from_env"` string in `value` for its environment
/// value. Unresolved markers stay in place. Returns how many were replaced.
pub fn inject_env_vars(value: &mut Value) -> usize {
    let mut path = Vec::new();
    inject_at(&mut path, value)
}

fn inject_at(path: &mut Vec<String>, value: &mut Value) -> usize {
    match value {
        Value::Object(map) => map
            .iter_mut()
            .map(|(key, child)| {
                path.push(key.clone());
                let replaced = inject_at(path, child);
                path.pop();
                replaced
            })
            .sum(),
        Value::String(text) if text == SECRET_MARKER => {
            let joined = path.join(".");
            match lookup(&joined) {
                Some(found) => {
                    debug!(path = %joined, "resolved secret from environment");
                    *text = found;
                    1
                }
                None => {
                    warn!(path = %joined, expected = %secret_var_name(&joined), "no environment value for secret");
                    0
                }
            }
        }
        _ => 0,
    }
}
