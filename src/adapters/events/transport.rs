//! BusTransport - Envelope transport over any `Broker`.
//!
//! ## Publishing
//!
//! Envelopes are encoded and published to the bus topic. Transient broker
//! failures are retried with bounded exponential backoff; once the attempts
//! are exhausted the failure escalates to `TransportError::Unavailable`.
//!
//! ## Subscribing
//!
//! Each subscription owns one background task:
//!
//! ```text
//! broker stream ──► sink.receive(raw) ──► next message
//!       │ (stream ends)
//!       ▼
//! wait reconnect backoff ──► broker.subscribe ──► new stream
//! ```
//!
//! Messages published while a subscription is reconnecting are not replayed.
//!
//! ## Graceful Shutdown
//!
//! `unsubscribe` signals the task through a watch channel. The signal is only
//! observed between messages, so an envelope that is mid-dispatch finishes
//! before the task exits.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::RetryPolicy;
use crate::domain::foundation::{EventEnvelope, TransportError};
use crate::ports::{Broker, BrokerStream, EnvelopeSink, EventPublisher};

/// Identifies one active subscription on a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(Uuid);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ActiveSubscription {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Envelope transport bound to one broker topic.
pub struct BusTransport {
    broker: Arc<dyn Broker>,
    topic: String,
    retry: RetryPolicy,
    subscriptions: Mutex<HashMap<SubscriptionHandle, ActiveSubscription>>,
}

impl BusTransport {
    /// Create a transport with the default retry policy.
    pub fn new(broker: Arc<dyn Broker>, topic: impl Into<String>) -> Self {
        Self::with_retry_policy(broker, topic, RetryPolicy::default())
    }

    /// Create a transport with a custom retry policy.
    pub fn with_retry_policy(
        broker: Arc<dyn Broker>,
        topic: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            broker,
            topic: topic.into(),
            retry,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Start delivering every message on the topic to `sink`.
    ///
    /// The first broker subscription is opened before returning, so an
    /// envelope published after this call resolves is seen by the sink.
    pub async fn subscribe(
        &self,
        sink: Arc<dyn EnvelopeSink>,
    ) -> Result<SubscriptionHandle, TransportError> {
        let stream = self.open_stream().await?;
        let handle = SubscriptionHandle(Uuid::new_v4());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = Listener {
            broker: Arc::clone(&self.broker),
            topic: self.topic.clone(),
            retry: self.retry.clone(),
            sink,
            handle,
        };
        let task = tokio::spawn(listener.run(stream, shutdown_rx));

        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle,
                ActiveSubscription {
                    shutdown: shutdown_tx,
                    task,
                },
            );

        info!(subscription = %handle, topic = %self.topic, broker = self.broker.name(), "Subscribed to bus");
        Ok(handle)
    }

    /// Stop a subscription and wait for its listener to finish.
    ///
    /// Returns `false` (and does nothing) if the handle is not active, e.g.
    /// on a second call.
    pub async fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let active = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle);

        let Some(active) = active else {
            debug!(subscription = %handle, "Unsubscribe for inactive subscription ignored");
            return false;
        };

        // Receiver gone means the task already exited
        let _ = active.shutdown.send(true);
        if let Err(e) = active.task.await {
            error!(subscription = %handle, error = %e, "Listener task ended abnormally");
        }

        info!(subscription = %handle, "Unsubscribed from bus");
        true
    }

    /// Number of subscriptions not yet unsubscribed.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn open_stream(&self) -> Result<BrokerStream, TransportError> {
        let mut attempt = 1;
        loop {
            match self.broker.subscribe(&self.topic).await {
                Ok(stream) => return Ok(stream),
                Err(TransportError::Transient(reason)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(attempt, ?delay, %reason, "Transient subscribe failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(TransportError::Transient(reason)) => {
                    return Err(TransportError::unavailable(format!(
                        "subscribe gave up after {} attempts: {}",
                        attempt, reason
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl EventPublisher for BusTransport {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), TransportError> {
        let bytes = envelope
            .encode()
            .map_err(|e| TransportError::unavailable(format!("envelope encoding failed: {}", e)))?;

        let mut attempt = 1;
        loop {
            match self.broker.publish(&self.topic, bytes.clone()).await {
                Ok(()) => {
                    debug!(
                        event_id = %envelope.event_id(),
                        event_type = envelope.event_type(),
                        attempt,
                        "Published envelope"
                    );
                    return Ok(());
                }
                Err(TransportError::Transient(reason)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        event_id = %envelope.event_id(),
                        attempt,
                        ?delay,
                        %reason,
                        "Transient publish failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(TransportError::Transient(reason)) => {
                    error!(event_id = %envelope.event_id(), attempt, %reason, "Publish retries exhausted");
                    return Err(TransportError::unavailable(format!(
                        "publish gave up after {} attempts: {}",
                        attempt, reason
                    )));
                }
                Err(e) => {
                    error!(event_id = %envelope.event_id(), error = %e, "Publish failed permanently");
                    return Err(e);
                }
            }
        }
    }
}

/// Background loop behind one subscription.
struct Listener {
    broker: Arc<dyn Broker>,
    topic: String,
    retry: RetryPolicy,
    sink: Arc<dyn EnvelopeSink>,
    handle: SubscriptionHandle,
}

impl Listener {
    async fn run(self, mut stream: BrokerStream, mut shutdown: watch::Receiver<bool>) {
        loop {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    next = stream.next() => match next {
                        Some(raw) => self.sink.receive(raw).await,
                        None => break,
                    },
                }
            }

            warn!(subscription = %self.handle, topic = %self.topic, "Broker connection lost, reconnecting");
            match self.reconnect(&mut shutdown).await {
                Some(reconnected) => stream = reconnected,
                None => return,
            }
        }
    }

    /// Re-subscribes until it succeeds. `None` means shutdown was requested.
    async fn reconnect(&self, shutdown: &mut watch::Receiver<bool>) -> Option<BrokerStream> {
        let mut attempt = 1;
        loop {
            let delay = self.retry.reconnect_backoff(attempt);
            tokio::select! {
                biased;
                _ = shutdown.changed() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            match self.broker.subscribe(&self.topic).await {
                Ok(stream) => {
                    info!(subscription = %self.handle, attempt, "Reconnected to broker");
                    return Some(stream);
                }
                Err(e) => {
                    warn!(subscription = %self.handle, attempt, error = %e, "Reconnect failed");
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }
}
