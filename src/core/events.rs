//! Search event bus
//!
//! The bus is the error signal of the search core: presentation subscribes
//! and reacts to committed results, failed fetches and partial location
//! resolution without polling.
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(1024);
//! let mut rx = bus.subscribe();
//!
//! let session = SearchSession::new(api, config, bus.clone());
//! session.refresh().await;
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{}: {:?}", envelope.event.kind(), envelope.event);
//! }
//! ```

use crate::core::error::ErrorSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Something observable happened in the search core
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchEvent {
    /// A fetch cycle committed new visible results
    ResultsCommitted {
        token: u64,
        total: u64,
        records: usize,
    },

    /// A superseded fetch completed and was dropped
    StaleDiscarded { token: u64, current: u64 },

    /// A fetch cycle failed; previous results stay visible
    FetchFailed { token: u64, error: ErrorSummary },

    /// Some location lookups failed; the ZIP union is smaller than expected
    LocationPartial {
        failed: Vec<String>,
        resolved_zips: usize,
    },

    /// The breed vocabulary was (re)loaded
    BreedsLoaded { count: usize },
}

impl SearchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchEvent::ResultsCommitted { .. } => "results_committed",
            SearchEvent::StaleDiscarded { .. } => "stale_discarded",
            SearchEvent::FetchFailed { .. } => "fetch_failed",
            SearchEvent::LocationPartial { .. } => "location_partial",
            SearchEvent::BreedsLoaded { .. } => "breeds_loaded",
        }
    }

    /// Whether presentation should raise its error flag
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SearchEvent::FetchFailed { .. } | SearchEvent::LocationPartial { .. }
        )
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: SearchEvent,
}

impl EventEnvelope {
    pub fn new(event: SearchEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: SearchEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive all events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
