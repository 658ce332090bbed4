//! In-memory collaborators shared by the pipeline tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{ClientRecord, GuestDetail, GuestProfile};
use crate::services::ClientLookup;
use crate::storage::GuestSink;

/// Lookup that fails a set number of times, then returns a fixed record.
#[derive(Clone, Default)]
pub struct FakeLookup {
    record: Option<ClientRecord>,
    failures_left: Arc<AtomicUsize>,
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeLookup {
    pub fn returning(record: ClientRecord) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ClientLookup for FakeLookup {
    async fn client_stats(&self, site_id: &str, mac: &str) -> Result<ClientRecord> {
        self.calls
            .lock()
            .unwrap()
            .push((site_id.to_string(), mac.to_string()));

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::Status {
                status: 503,
                url: format!("sites/{site_id}/stats/clients/{mac}"),
            });
        }

        self.record.clone().ok_or_else(|| AppError::Status {
            status: 404,
            url: format!("sites/{site_id}/stats/clients/{mac}"),
        })
    }
}

/// Sink that keeps records in memory and can be switched to fail.
#[derive(Clone, Default)]
pub struct MemorySink {
    pub records: Arc<Mutex<Vec<GuestProfile>>>,
    pub fail: Arc<AtomicBool>,
}

impl MemorySink {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<GuestProfile> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl GuestSink for MemorySink {
    async fn append(&self, profile: &GuestProfile, day: NaiveDate) -> Result<PathBuf> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        self.records.lock().unwrap().push(profile.clone());
        Ok(PathBuf::from(format!("memory-{day}")))
    }
}

/// Raw stream message for one client on one site.
pub fn client_message(site_id: &str, mac: &str, ip: &str, ssid: &str, is_guest: bool) -> String {
    let data = serde_json::json!({
        "mac": mac,
        "ip": ip,
        "ssid": ssid,
        "is_guest": is_guest,
    });
    serde_json::json!({
        "event": "data",
        "channel": format!("/sites/{site_id}/stats/clients"),
        "data": data.to_string(),
    })
    .to_string()
}

/// Enrichment record, with a guest block when `name` is given.
pub fn client_record(mac: &str, ip: &str, name: Option<&str>) -> ClientRecord {
    ClientRecord {
        mac: mac.to_string(),
        ip: ip.to_string(),
        assoc_time: 1_700_000_000.0,
        ssid: "Corp-Guest".to_string(),
        guest: name.map(|n| GuestDetail {
            name: Some(n.to_string()),
            ..GuestDetail::default()
        }),
    }
}
