//! Guest record written to the output store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ClientRecord, Site};

/// Version of the encoded record layout.
pub const SCHEMA_VERSION: u32 = 1;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One enriched guest session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestProfile {
    pub schema_version: u32,
    pub mac: String,
    pub ip: String,
    pub assoc_time: String,
    pub ssid: String,
    pub site_id: String,
    pub site_name: Option<String>,
    pub event_date: String,
    pub guest_data_present: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_email: Option<String>,
}

impl GuestProfile {
    /// Build a profile from an enrichment result.
    ///
    /// Guest portal fields are filled only when the record carries a
    /// `guest` block.
    pub fn from_client(
        record: &ClientRecord,
        site_id: &str,
        site: Option<&Site>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut profile = Self {
            schema_version: SCHEMA_VERSION,
            mac: record.mac.clone(),
            ip: record.ip.clone(),
            assoc_time: format_epoch(record.assoc_time),
            ssid: record.ssid.clone(),
            site_id: site_id.to_string(),
            site_name: site.map(|s| s.name.clone()),
            event_date: now.format(TIME_FORMAT).to_string(),
            guest_data_present: false,
            authorized_time: None,
            auth_method: None,
            access_code_email: None,
            name: None,
            email: None,
            company: None,
            sponsor_name: None,
            sponsor_email: None,
        };

        if let Some(guest) = &record.guest {
            profile.guest_data_present = true;
            profile.authorized_time = guest.authorized_time.map(format_epoch);
            profile.auth_method = guest.auth_method.clone();
            profile.access_code_email = guest.access_code_email.clone();
            profile.name = guest.name.clone();
            profile.email = guest.email.clone();
            profile.company = guest.company.clone();
            profile.sponsor_name = guest.sponsor_name.clone();
            profile.sponsor_email = guest.sponsor_email.clone();
        }

        profile
    }
}

/// Render epoch seconds as a UTC timestamp string.
fn format_epoch(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0)
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}
