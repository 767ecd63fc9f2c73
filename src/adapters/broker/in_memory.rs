//! In-memory broker for tests and single-process demos.
//!
//! Every node in the process shares one `InMemoryBroker`; each subscription
//! gets its own unbounded channel. Failure injection and simulated
//! disconnects let tests exercise the transport's retry and reconnect paths.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{EventEnvelope, TransportError};
use crate::ports::{Broker, BrokerStream};

/// In-memory pub/sub broker.
///
/// Features:
/// - Fan-out to every live subscription of a topic
/// - Message capture for assertions
/// - Injected publish/subscribe failures
/// - Simulated connection loss
///
/// # Example
///
/// ```ignore
/// let broker = Arc::new(InMemoryBroker::new());
/// broker.fail_next_publishes(TransportError::transient("reset"), 2);
///
/// transport.publish(&envelope).await?; // succeeds on the third attempt
/// assert_eq!(broker.published_count(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryBroker {
    subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
    published: Mutex<Vec<(String, Vec<u8>)>>,
    publish_failures: Mutex<VecDeque<TransportError>>,
    subscribe_failures: Mutex<VecDeque<TransportError>>,
    publish_attempts: AtomicUsize,
    subscribe_attempts: AtomicUsize,
}

impl InMemoryBroker {
    /// Creates a new broker with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes the next `count` publish calls fail with `error`.
    pub fn fail_next_publishes(&self, error: TransportError, count: usize) {
        let mut failures = self
            .publish_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        failures.extend(std::iter::repeat(error).take(count));
    }

    /// Makes the next `count` subscribe calls fail with `error`.
    pub fn fail_next_subscribes(&self, error: TransportError, count: usize) {
        let mut failures = self
            .subscribe_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        failures.extend(std::iter::repeat(error).take(count));
    }

    /// Ends every open subscription stream, as if connections dropped.
    pub fn disconnect_all(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Returns count of successfully published messages.
    pub fn published_count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Total publish calls, failed ones included.
    pub fn publish_attempts(&self) -> usize {
        self.publish_attempts.load(Ordering::SeqCst)
    }

    /// Total subscribe calls, failed ones included.
    pub fn subscribe_attempts(&self) -> usize {
        self.subscribe_attempts.load(Ordering::SeqCst)
    }

    /// Decodes every published message that is a valid envelope.
    pub fn published_envelopes(&self) -> Vec<EventEnvelope> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(_, bytes)| EventEnvelope::decode(bytes).ok())
            .collect()
    }

    fn next_failure(queue: &Mutex<VecDeque<TransportError>>) -> Option<TransportError> {
        queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.publish_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = Self::next_failure(&self.publish_failures) {
            return Err(error);
        }

        {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(senders) = subscribers.get_mut(topic) {
                // Closed receivers belong to ended subscriptions
                senders.retain(|sender| sender.unbounded_send(payload.clone()).is_ok());
            }
        }

        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<BrokerStream, TransportError> {
        self.subscribe_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = Self::next_failure(&self.subscribe_failures) {
            return Err(error);
        }

        let (sender, receiver) = mpsc::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(sender);
        Ok(receiver.boxed())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
