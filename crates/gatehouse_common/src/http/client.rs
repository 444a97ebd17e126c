// --- File: crates/gatehouse_common/src/http/client.rs ---
use gatehouse_config::ApiConfig;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("gatehouse/", env!("CARGO_PKG_VERSION"));

/// Creates a new HTTP client with custom configuration.
///
/// # Arguments
///
/// * `timeout_secs` - The timeout in seconds for the client
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}

/// Creates the client used to talk to the authority described by `api`.
///
/// The transport timeout is the only client-side timeout. Redirects are not
/// followed: the bearer token must only reach the configured host.
pub fn client_for(api: &ApiConfig) -> Result<Client, ReqwestError> {
    create_client(api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS), false)
}
