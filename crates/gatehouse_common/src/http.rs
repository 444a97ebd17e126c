use serde::Deserialize;

// Include the client module
pub mod client;

/// Response wrapper every authority endpoint uses.
///
/// A missing or false `success` is a failure whatever the HTTP status was.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// The authority's own explanation of a failure: `error`, else `message`.
    pub fn failure_message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}
