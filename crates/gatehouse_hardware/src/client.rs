//! HTTP client for the hardware endpoints of the authority.
//!
//! Every request carries the session's bearer token and an `X-Request-Id`.
//! Responses are decoded as the `{ success, data, error, message }` envelope;
//! anything but `success: true` is a rejection, whatever the HTTP status.
//! Nothing is retried.

use crate::error::{validation, HardwareError, GENERIC_REJECTION_MESSAGE};
use gatehouse_common::{
    client_for, ApiEnvelope, BoxFuture, Device, DeviceSecret, DeviceUpdate, Gate, GateUpdate,
    HardwareAuthority, IssuedDevice, Location, NewDevice, NewGate, RegeneratedSecret,
};
use gatehouse_config::{AppConfig, Session};
use reqwest::{header, Client, Method, RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Client for `/hardware/*` and `/locations`.
#[derive(Clone)]
pub struct HardwareClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HardwareClient {
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    /// Builds a client for the configured authority using the session token.
    pub fn from_config(config: &AppConfig, session: &Session) -> Result<Self, HardwareError> {
        let client = client_for(&config.api)?;
        Ok(Self::new(client, &config.api.base_url, &session.token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, HardwareError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        parsed.map_err(|err| validation(format!("Invalid authority URL '{}': {}", raw, err)))
    }

    fn request(&self, method: Method, url: Url, request_id: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id)
    }

    /// Sends one request and unwraps the envelope.
    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Option<T>, HardwareError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, query)?;
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("authority_request", %method, path, request_id = %request_id);

        async move {
            let mut builder = self.request(method, url, &request_id);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|err| {
                warn!(error = %err, "authority unreachable");
                HardwareError::from(err)
            })?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|err| {
                warn!(%status, error = %err, "failed to read authority response");
                HardwareError::from(err)
            })?;

            let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes).map_err(|err| {
                warn!(%status, error = %err, "authority response is not a valid envelope");
                HardwareError::Transport(format!("invalid response (HTTP {}): {}", status, err))
            })?;

            if !envelope.success {
                let message = envelope
                    .failure_message()
                    .unwrap_or(GENERIC_REJECTION_MESSAGE)
                    .to_string();
                info!(%status, %message, "authority rejected request");
                return Err(HardwareError::Rejected { message });
            }

            debug!(%status, "authority request succeeded");
            Ok(envelope.data)
        }
        .instrument(span)
        .await
    }

    async fn call_for_data<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, HardwareError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(method, path, query, body).await?.ok_or_else(|| {
            HardwareError::Transport(format!("response to {} carried no data", path))
        })
    }

    async fn call_for_success<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), HardwareError>
    where
        B: Serialize + ?Sized,
    {
        self.call::<B, IgnoredAny>(method, path, &[], body)
            .await
            .map(|_| ())
    }
}

/// Ids are opaque but must stay a single path segment.
fn path_id(id: &str) -> Result<&str, HardwareError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        return Err(validation(format!("Invalid id '{}'", id)));
    }
    Ok(trimmed)
}

impl HardwareAuthority for HardwareClient {
    type Error = HardwareError;

    fn create_device<'a>(
        &'a self,
        device: &'a NewDevice,
    ) -> BoxFuture<'a, IssuedDevice, Self::Error> {
        Box::pin(async move {
            self.call_for_data(Method::POST, "/hardware/devices", &[], Some(device))
                .await
        })
    }

    fn regenerate_secret<'a>(
        &'a self,
        device_id: &'a str,
    ) -> BoxFuture<'a, DeviceSecret, Self::Error> {
        Box::pin(async move {
            let path = format!("/hardware/devices/{}/regenerate-secret", path_id(device_id)?);
            let regenerated: RegeneratedSecret = self
                .call_for_data::<(), _>(Method::POST, &path, &[], None)
                .await?;
            Ok(regenerated.device_secret)
        })
    }

    fn update_device<'a>(
        &'a self,
        device_id: &'a str,
        update: &'a DeviceUpdate,
    ) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let path = format!("/hardware/devices/{}", path_id(device_id)?);
            self.call_for_success(Method::PUT, &path, Some(update)).await
        })
    }

    fn delete_device<'a>(&'a self, device_id: &'a str) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let path = format!("/hardware/devices/{}", path_id(device_id)?);
            self.call_for_success::<()>(Method::DELETE, &path, None).await
        })
    }

    fn list_devices<'a>(
        &'a self,
        location_id: &'a str,
    ) -> BoxFuture<'a, Vec<Device>, Self::Error> {
        Box::pin(async move {
            let devices: Option<Vec<Device>> = self
                .call::<(), _>(
                    Method::GET,
                    "/hardware/devices",
                    &[("location_id", location_id)],
                    None,
                )
                .await?;
            Ok(devices.unwrap_or_default())
        })
    }

    fn list_gates<'a>(&'a self, location_id: &'a str) -> BoxFuture<'a, Vec<Gate>, Self::Error> {
        Box::pin(async move {
            let gates: Option<Vec<Gate>> = self
                .call::<(), _>(
                    Method::GET,
                    "/hardware/gates",
                    &[("location_id", location_id)],
                    None,
                )
                .await?;
            Ok(gates.unwrap_or_default())
        })
    }

    fn create_gate<'a>(&'a self, gate: &'a NewGate) -> BoxFuture<'a, Gate, Self::Error> {
        Box::pin(async move {
            self.call_for_data(Method::POST, "/hardware/gates", &[], Some(gate))
                .await
        })
    }

    fn update_gate<'a>(
        &'a self,
        gate_id: &'a str,
        update: &'a GateUpdate,
    ) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let path = format!("/hardware/gates/{}", path_id(gate_id)?);
            self.call_for_success(Method::PUT, &path, Some(update)).await
        })
    }

    fn delete_gate<'a>(&'a self, gate_id: &'a str) -> BoxFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let path = format!("/hardware/gates/{}", path_id(gate_id)?);
            self.call_for_success::<()>(Method::DELETE, &path, None).await
        })
    }

    fn list_locations(&self) -> BoxFuture<'_, Vec<Location>, Self::Error> {
        Box::pin(async move {
            let locations: Option<Vec<Location>> = self
                .call::<(), _>(Method::GET, "/locations", &[], None)
                .await?;
            Ok(locations.unwrap_or_default())
        })
    }
}
