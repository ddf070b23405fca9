//! Request coalescing for preview fetches.
//!
//! When the selection path and a prefetch hint (or two renderers) ask for the
//! same font file at once, only one fetch actually runs. Every caller receives
//! the same outcome, success or failure.
//!
//! # Architecture
//!
//! ```text
//! get_preview_src(a) ─┐
//!                     │                             Producer
//! prefetch(a) ────────┼──► FetchCoalescer ────────► (one task)
//!                     │        │                        │
//! get_preview_src(a) ─┘        │                        │
//!                              ▼                        ▼
//!                       [all callers                 outcome
//!                        receive same ◄─────────────────┘
//!                        outcome]
//! ```
//!
//! # Implementation
//!
//! A `HashMap<String, broadcast::Sender>` tracks in-flight fetches. The first
//! caller for a key spawns the producer on its own task; later callers
//! subscribe to the same sender. When the producer finishes, the entry is
//! removed *before* the outcome is broadcast, so a call arriving afterwards
//! starts a fresh fetch instead of replaying a stale failure.

use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::error::{FetchError, PreviewError};
use super::payload::PreviewSrc;

/// Outcome shared by every caller of one fetch episode.
pub type FetchOutcome = Result<PreviewSrc, PreviewError>;

type InFlightMap = HashMap<String, broadcast::Sender<FetchOutcome>>;

/// Statistics for monitoring coalescing effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total acquire calls
    pub total_requests: u64,
    /// Calls that joined an existing fetch
    pub coalesced_requests: u64,
    /// Calls that started a new fetch
    pub new_requests: u64,
}

impl CoalescerStats {
    /// Returns the coalescing ratio (0.0 to 1.0)
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// Result of registering interest in a key.
enum Registration {
    /// First caller: must start the producer and publish through `sender`
    Leader {
        sender: broadcast::Sender<FetchOutcome>,
        receiver: broadcast::Receiver<FetchOutcome>,
    },
    /// A fetch is already running: wait on this receiver
    Coalesced(broadcast::Receiver<FetchOutcome>),
}

/// Ensures at most one outstanding fetch per resource identity.
///
/// Must be used from within a tokio runtime; producers run on spawned tasks so
/// that a started fetch completes even if every caller stops waiting.
pub struct FetchCoalescer {
    in_flight: Arc<Mutex<InFlightMap>>,
    stats: Mutex<CoalescerStats>,
}

impl FetchCoalescer {
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            stats: Mutex::new(CoalescerStats::default()),
        }
    }

    /// Fetch `key` through `producer`, joining an in-flight fetch if one exists.
    ///
    /// `producer` is only invoked when no fetch for `key` is pending. Whatever
    /// it returns, success or failure, is delivered to every caller that
    /// joined this episode. Failures are not remembered.
    pub async fn acquire<F, Fut>(&self, key: &str, producer: F) -> FetchOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let mut receiver = match self.register(key) {
            Registration::Coalesced(receiver) => receiver,
            Registration::Leader { sender, receiver } => {
                self.spawn_fetch(key.to_string(), sender, producer());
                receiver
            }
        };

        match receiver.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Aborted {
                key: key.to_string(),
            }
            .into()),
        }
    }

    /// Returns true if a fetch for `key` is currently running.
    pub fn is_pending(&self, key: &str) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    /// Returns the number of currently in-flight fetches.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoalescerStats {
        *self.stats.lock()
    }

    /// Logs current statistics.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            total_requests = stats.total_requests,
            coalesced = stats.coalesced_requests,
            new_requests = stats.new_requests,
            in_flight = self.in_flight_count(),
            coalescing_ratio = format!("{:.1}%", stats.coalescing_ratio() * 100.0),
            "Preview fetch coalescing statistics"
        );
    }

    fn register(&self, key: &str) -> Registration {
        let mut in_flight = self.in_flight.lock();
        let mut stats = self.stats.lock();
        stats.total_requests += 1;

        if let Some(sender) = in_flight.get(key) {
            stats.coalesced_requests += 1;
            debug!(key, "Coalescing preview fetch onto in-flight request");
            Registration::Coalesced(sender.subscribe())
        } else {
            // One outcome is ever sent per channel
            let (sender, receiver) = broadcast::channel(1);
            in_flight.insert(key.to_string(), sender.clone());
            stats.new_requests += 1;
            debug!(
                key,
                in_flight_count = in_flight.len(),
                "Starting new preview fetch"
            );
            Registration::Leader { sender, receiver }
        }
    }

    fn spawn_fetch<Fut>(&self, key: String, sender: broadcast::Sender<FetchOutcome>, fetch: Fut)
    where
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Aborted { key: key.clone() }.into()),
            };

            // Clear the pending entry before anyone observes the outcome
            in_flight.lock().remove(&key);

            let waiters = sender.receiver_count();
            let _ = sender.send(outcome);
            debug!(key = %key, waiters, "Preview fetch completed");
        });
    }
}

impl Default for FetchCoalescer {
    fn default() -> Self {
        Self::new()
    }
}
