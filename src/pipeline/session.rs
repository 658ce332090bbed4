// src/pipeline/session.rs

//! Stream session manager.
//!
//! Keeps one live connection to the event stream, subscribes every site on
//! each connect, and reconnects after a fixed delay whenever the connection
//! ends, forever. An interrupt closes the current connection and lets the
//! reconnect path take over; it never stops the session. With no sites to
//! subscribe to, the session returns without connecting.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::Result;
use crate::pipeline::connection::{Connector, EventStream};
use crate::pipeline::{GuestTracker, MessageOutcome};
use crate::services::ClientLookup;
use crate::storage::GuestSink;

/// Request to close the current stream connection.
///
/// Triggering while no connection is open is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ReconnectSignal {
    notify: Arc<Notify>,
}

impl ReconnectSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.notify.notify_waiters();
    }
}

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ConnectFailed,
    Closed,
    Interrupted,
    Errored,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::ConnectFailed => write!(f, "connection failed"),
            SessionEnd::Closed => write!(f, "stream closed"),
            SessionEnd::Interrupted => write!(f, "stream closed on interrupt"),
            SessionEnd::Errored => write!(f, "stream error"),
        }
    }
}

/// Owns the connection lifecycle and the guest tracker.
pub struct StreamSession<C, L, S> {
    connector: C,
    tracker: GuestTracker<L, S>,
    reconnect_delay: Duration,
    signal: ReconnectSignal,
}

impl<C, L, S> StreamSession<C, L, S>
where
    C: Connector,
    L: ClientLookup,
    S: GuestSink,
{
    pub fn new(connector: C, tracker: GuestTracker<L, S>, reconnect_delay: Duration) -> Self {
        Self {
            connector,
            tracker,
            reconnect_delay,
            signal: ReconnectSignal::new(),
        }
    }

    /// Handle to request a reconnect from another task.
    pub fn signal(&self) -> ReconnectSignal {
        self.signal.clone()
    }

    pub fn tracker(&self) -> &GuestTracker<L, S> {
        &self.tracker
    }

    /// Run forever, reconnecting after every disconnect.
    ///
    /// Returns immediately when there are no sites to monitor.
    pub async fn run(&mut self) {
        if self.tracker.sites().is_empty() {
            log::info!("No sites to monitor. Exiting.");
            return;
        }
        log::info!("Monitoring {} sites", self.tracker.sites().len());

        let mut reconnects: u64 = 0;
        loop {
            let end = self.run_connection().await;
            log::info!(
                "Stream session ended ({}); reconnecting in {:?}",
                end,
                self.reconnect_delay
            );
            tokio::time::sleep(self.reconnect_delay).await;
            reconnects += 1;
            log::info!("reconnect [{}]", reconnects);
        }
    }

    /// Connect, subscribe, and process messages until the connection ends.
    pub async fn run_connection(&mut self) -> SessionEnd {
        // Registered before connecting so a trigger during connect or
        // subscribe still closes this connection.
        let signal = self.signal.clone();
        let interrupted = signal.notify.notified();
        tokio::pin!(interrupted);

        let mut stream = match self.connector.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("Stream connection failed: {}", e);
                return SessionEnd::ConnectFailed;
            }
        };

        if let Err(e) = self.subscribe_all(&mut stream).await {
            log::error!("Subscription failed: {}", e);
            return SessionEnd::Errored;
        }

        loop {
            tokio::select! {
                _ = &mut interrupted => {
                    log::info!("Interrupt received, closing stream connection");
                    if let Err(e) = stream.close().await {
                        log::debug!("Close failed: {}", e);
                    }
                    return SessionEnd::Interrupted;
                }
                next = stream.next_text() => match next {
                    Some(Ok(text)) => {
                        let outcome = self.tracker.handle_message(&text).await;
                        if let MessageOutcome::Recorded { identity, .. } = &outcome {
                            log::debug!(
                                "{} guests recorded this run (latest {})",
                                self.tracker.ledger().len(),
                                identity
                            );
                        }
                    }
                    Some(Err(e)) => {
                        log::error!("Stream error: {}", e);
                        return SessionEnd::Errored;
                    }
                    None => return SessionEnd::Closed,
                }
            }
        }
    }

    async fn subscribe_all(&self, stream: &mut C::Stream) -> Result<()> {
        for site in self.tracker.sites() {
            let topic = site.client_topic();
            log::info!("Subscribing to {} (site {})", topic, site.name);
            let request = serde_json::json!({ "subscribe": topic });
            stream.send_text(request.to_string()).await?;
        }
        Ok(())
    }
}
