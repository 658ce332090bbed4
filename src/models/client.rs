//! Stream events and client statistics.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Raw message received on the live stream.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    /// Topic the event was published on, e.g. `/sites/<id>/stats/clients`
    pub channel: String,

    /// JSON-encoded client payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl InboundEvent {
    /// Parse a raw stream message.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::decode(format!("invalid event: {e}")))
    }

    /// Encoded payload, when present as a string.
    pub fn encoded_data(&self) -> Option<&str> {
        self.data.as_ref().and_then(|v| v.as_str())
    }

    /// Decode the nested client payload.
    pub fn decode_client(&self) -> Result<Option<ClientEvent>> {
        match self.encoded_data() {
            Some(data) => serde_json::from_str(data)
                .map(Some)
                .map_err(|e| AppError::decode(format!("invalid client data: {e}"))),
            None => Ok(None),
        }
    }
}

/// Client fields carried by a stream event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientEvent {
    pub mac: String,

    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default)]
    pub ssid: Option<String>,

    #[serde(default)]
    pub is_guest: Option<bool>,
}

/// Deduplication key for a guest session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GuestIdentity {
    pub mac: String,
    pub ip: String,
}

impl GuestIdentity {
    pub fn new(mac: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            ip: ip.into(),
        }
    }
}

impl std::fmt::Display for GuestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.mac, self.ip)
    }
}

/// Client statistics returned by the per-client lookup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub mac: String,
    pub ip: String,

    /// Association time, epoch seconds
    pub assoc_time: f64,

    pub ssid: String,

    /// Portal details, only present for authorized guests
    #[serde(default)]
    pub guest: Option<GuestDetail>,
}

/// Guest portal details nested in a client record.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GuestDetail {
    /// Authorization time, epoch seconds
    #[serde(default)]
    pub authorized_time: Option<f64>,
    #[serde(default)]
    pub auth_method: Option<String>,
    #[serde(default)]
    pub access_code_email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub sponsor_name: Option<String>,
    #[serde(default)]
    pub sponsor_email: Option<String>,
}
