//! One-time device secret holder.
//!
//! A `DeviceSecret` is move-only: it cannot be cloned, its `Debug` output is
//! redacted, and its memory is zeroed when it is dropped. Whoever owns the
//! value owns the only plaintext copy on this client.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct DeviceSecret(String);

impl DeviceSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Reveals the plaintext. Callers must not store the returned slice.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceSecret([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for DeviceSecret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(DeviceSecret)
    }
}

// Only the agent bundle serializes a secret.
impl Serialize for DeviceSecret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
