// src/pipeline/tracker.rs

//! Per-message guest processing.
//!
//! Each stream message goes through the same steps, strictly one at a time:
//! decode, classify, check the ledger, enrich, persist, then record in the
//! ledger. A guest is only added to the ledger once its record is on disk, so
//! a failed lookup or write is retried the next time the guest is announced.

use std::path::PathBuf;

use chrono::Utc;

use crate::error::Result;
use crate::models::{GuestIdentity, GuestProfile, InboundEvent, Site};
use crate::pipeline::GuestLedger;
use crate::services::{ClientLookup, GuestRules};
use crate::storage::GuestSink;
use crate::utils::extract_site_id;

/// What happened to one stream message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// No string `data` payload to inspect
    Skipped,
    /// Channel did not name a site
    UnknownChannel,
    /// Message or payload could not be decoded
    Malformed(String),
    NotGuest,
    AlreadyRecorded(GuestIdentity),
    /// Lookup failed; the guest stays eligible
    EnrichmentFailed(GuestIdentity),
    /// Write failed; the guest stays eligible
    PersistFailed(GuestIdentity),
    Recorded {
        identity: GuestIdentity,
        path: PathBuf,
    },
}

/// Guest detection state for one process run.
pub struct GuestTracker<L, S> {
    lookup: L,
    sink: S,
    rules: GuestRules,
    sites: Vec<Site>,
    ledger: GuestLedger,
    current_site: Option<String>,
}

impl<L, S> GuestTracker<L, S>
where
    L: ClientLookup,
    S: GuestSink,
{
    pub fn new(lookup: L, sink: S, rules: GuestRules, sites: Vec<Site>) -> Self {
        Self {
            lookup,
            sink,
            rules,
            sites,
            ledger: GuestLedger::new(),
            current_site: None,
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn ledger(&self) -> &GuestLedger {
        &self.ledger
    }

    /// Site of the most recent message.
    pub fn current_site(&self) -> Option<&str> {
        self.current_site.as_deref()
    }

    fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    fn site_label(&self, id: &str) -> String {
        match self.site(id) {
            Some(site) => format!("{} ({})", id, site.name),
            None => id.to_string(),
        }
    }

    /// Handle one raw stream message. Never fails; problems are logged and
    /// reported in the outcome.
    pub async fn handle_message(&mut self, raw: &str) -> MessageOutcome {
        let event = match InboundEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                log::error!("Dropping stream message: {}", e);
                return MessageOutcome::Malformed(e.to_string());
            }
        };

        let Some(site_id) = extract_site_id(&event.channel) else {
            log::warn!("No site id in channel '{}', message dropped", event.channel);
            return MessageOutcome::UnknownChannel;
        };
        self.current_site = Some(site_id.clone());

        match self.process(&event, &site_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!(
                    "Error processing message for site {}: {}",
                    self.site_label(&site_id),
                    e
                );
                MessageOutcome::Malformed(e.to_string())
            }
        }
    }

    async fn process(&mut self, event: &InboundEvent, site_id: &str) -> Result<MessageOutcome> {
        let Some(client) = event.decode_client()? else {
            return Ok(MessageOutcome::Skipped);
        };

        let Some(identity) = self.rules.classify(&client)? else {
            log::debug!("User {} is not a guest", client.mac);
            return Ok(MessageOutcome::NotGuest);
        };
        log::info!("User {} is a guest", client.mac);

        if self.ledger.contains(&identity) {
            log::info!("Guest {} already recorded", identity);
            return Ok(MessageOutcome::AlreadyRecorded(identity));
        }

        Ok(self.record_new_guest(identity, site_id).await)
    }

    async fn record_new_guest(&mut self, identity: GuestIdentity, site_id: &str) -> MessageOutcome {
        log::info!(
            "New guest detected: {} on site {}",
            identity,
            self.site_label(site_id)
        );

        let record = match self.lookup.client_stats(site_id, &identity.mac).await {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "Client lookup failed for guest {}: {}. Will retry on its next event",
                    identity,
                    e
                );
                return MessageOutcome::EnrichmentFailed(identity);
            }
        };

        if record.guest.is_none() {
            log::info!("No guest details for {}", identity);
        }

        let now = Utc::now();
        let profile = GuestProfile::from_client(&record, site_id, self.site(site_id), now);

        match self.sink.append(&profile, now.date_naive()).await {
            Ok(path) => {
                self.ledger.record(identity.clone());
                log::info!("Guest {} written to {}", identity, path.display());
                MessageOutcome::Recorded { identity, path }
            }
            Err(e) => {
                log::error!("Failed to write guest {}: {}", identity, e);
                MessageOutcome::PersistFailed(identity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FakeLookup, MemorySink, client_message, client_record};

    fn tracker(lookup: &FakeLookup, sink: &MemorySink) -> GuestTracker<FakeLookup, MemorySink> {
        GuestTracker::new(
            lookup.clone(),
            sink.clone(),
            GuestRules::default(),
            vec![Site::new("S1", "Main_Office"), Site::new("S2", "Annex")],
        )
    }

    fn guest_event() -> String {
        client_message("S1", "AA:BB", "10.0.0.5", "Corp-Guest", true)
    }

    #[tokio::test]
    async fn test_guest_recorded_with_details() {
        let lookup = FakeLookup::returning(client_record("AA:BB", "10.0.0.5", Some("Jane")));
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        let outcome = tracker.handle_message(&guest_event()).await;

        assert!(matches!(outcome, MessageOutcome::Recorded { .. }));
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].guest_data_present);
        assert_eq!(records[0].name.as_deref(), Some("Jane"));
        assert_eq!(records[0].site_id, "S1");
        assert_eq!(records[0].site_name.as_deref(), Some("Main_Office"));
        assert_eq!(tracker.current_site(), Some("S1"));
        assert_eq!(
            *lookup.calls.lock().unwrap(),
            vec![("S1".to_string(), "AA:BB".to_string())]
        );
    }

    #[tokio::test]
    async fn test_repeated_guest_recorded_once() {
        let lookup = FakeLookup::returning(client_record("AA:BB", "10.0.0.5", None));
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        tracker.handle_message(&guest_event()).await;
        let second = tracker.handle_message(&guest_event()).await;
        let third = tracker.handle_message(&guest_event()).await;

        assert_eq!(
            second,
            MessageOutcome::AlreadyRecorded(GuestIdentity::new("AA:BB", "10.0.0.5"))
        );
        assert_eq!(third, second);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(lookup.call_count(), 1);
        assert_eq!(tracker.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_non_guest_issues_no_lookup() {
        let lookup = FakeLookup::returning(client_record("CC:DD", "10.0.0.9", None));
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        let outcome = tracker
            .handle_message(&client_message("S1", "CC:DD", "10.0.0.9", "Corp", false))
            .await;

        assert_eq!(outcome, MessageOutcome::NotGuest);
        assert_eq!(lookup.call_count(), 0);
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried_on_next_event() {
        let lookup =
            FakeLookup::returning(client_record("AA:BB", "10.0.0.5", None)).failing_first(1);
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);
        let identity = GuestIdentity::new("AA:BB", "10.0.0.5");

        let first = tracker.handle_message(&guest_event()).await;
        assert_eq!(first, MessageOutcome::EnrichmentFailed(identity.clone()));
        assert!(!tracker.ledger().contains(&identity));

        let second = tracker.handle_message(&guest_event()).await;
        assert!(matches!(second, MessageOutcome::Recorded { .. }));
        assert_eq!(lookup.call_count(), 2);
        assert!(tracker.ledger().contains(&identity));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_guest_out_of_ledger() {
        let lookup = FakeLookup::returning(client_record("AA:BB", "10.0.0.5", None));
        let sink = MemorySink::default();
        sink.set_failing(true);
        let mut tracker = tracker(&lookup, &sink);
        let identity = GuestIdentity::new("AA:BB", "10.0.0.5");

        let outcome = tracker.handle_message(&guest_event()).await;
        assert_eq!(outcome, MessageOutcome::PersistFailed(identity.clone()));
        assert!(tracker.ledger().is_empty());

        sink.set_failing(false);
        let outcome = tracker.handle_message(&guest_event()).await;
        assert!(matches!(outcome, MessageOutcome::Recorded { .. }));
        assert_eq!(lookup.call_count(), 2);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_messages_do_not_stop_processing() {
        let lookup = FakeLookup::returning(client_record("AA:BB", "10.0.0.5", None));
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        assert!(matches!(
            tracker.handle_message("not json").await,
            MessageOutcome::Malformed(_)
        ));
        assert!(matches!(
            tracker
                .handle_message(r#"{"channel": "/sites/S1/stats/clients", "data": "{broken"}"#)
                .await,
            MessageOutcome::Malformed(_)
        ));
        // Guest without an ip cannot be keyed.
        assert!(matches!(
            tracker
                .handle_message(
                    r#"{"channel": "/sites/S1/stats/clients", "data": "{\"mac\": \"AA:BB\", \"is_guest\": true}"}"#
                )
                .await,
            MessageOutcome::Malformed(_)
        ));

        let outcome = tracker.handle_message(&guest_event()).await;
        assert!(matches!(outcome, MessageOutcome::Recorded { .. }));
    }

    #[tokio::test]
    async fn test_unknown_channel_and_missing_data() {
        let lookup = FakeLookup::default();
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        let outcome = tracker
            .handle_message(r#"{"channel": "/orgs/o1/events", "data": "{}"}"#)
            .await;
        assert_eq!(outcome, MessageOutcome::UnknownChannel);
        assert_eq!(tracker.current_site(), None);

        let outcome = tracker
            .handle_message(r#"{"channel": "/sites/S2/stats/clients"}"#)
            .await;
        assert_eq!(outcome, MessageOutcome::Skipped);
        assert_eq!(tracker.current_site(), Some("S2"));
    }

    #[tokio::test]
    async fn test_ssid_keyword_without_flag_is_guest() {
        let lookup = FakeLookup::returning(client_record("EE:FF", "10.0.0.7", None));
        let sink = MemorySink::default();
        let mut tracker = tracker(&lookup, &sink);

        let outcome = tracker
            .handle_message(&client_message("S2", "EE:FF", "10.0.0.7", "Lobby-HOTSPOT", false))
            .await;

        assert!(matches!(outcome, MessageOutcome::Recorded { .. }));
        assert_eq!(sink.records()[0].site_name.as_deref(), Some("Annex"));
    }
}
