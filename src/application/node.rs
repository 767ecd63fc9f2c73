//! Node - Explicit context that wires one bus participant together.
//!
//! A node owns its identity, the transport bound to the bus topic, the
//! dispatch registry and the dedup store. Producers and consumers are cheap
//! views over that context.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──► start (subscribe, announce joined) ──► shutdown (announce left, unsubscribe)
//!   ▲                                                  │
//!   └──────────────────────────────────────────────────┘
//! ```
//!
//! The presence tracker lives exactly as long as the subscription: `start`
//! registers it and `shutdown` (or a failed `start`) removes it again.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::consumer::Consumer;
use super::dispatch::DispatchRegistry;
use super::handlers::{PresenceTracker, PRESENCE_JOINED, PRESENCE_LEFT};
use super::producer::Producer;
use crate::adapters::{BusTransport, RecencyEventStore, SubscriptionHandle};
use crate::config::AppConfig;
use crate::domain::foundation::{BusError, Payload, ValidationError};
use crate::domain::node::{NodeId, NodeIdentity};
use crate::ports::{Broker, EventHandler, ProcessedEventStore};

const PRESENCE_EVENTS: [&str; 2] = [PRESENCE_JOINED, PRESENCE_LEFT];

/// What a started node holds on to.
#[derive(Default)]
struct Lifecycle {
    subscription: Option<SubscriptionHandle>,
    presence: Option<Arc<dyn EventHandler>>,
}

/// One participant on the bus.
pub struct Node {
    identity: Arc<NodeIdentity>,
    transport: Arc<BusTransport>,
    registry: Arc<DispatchRegistry>,
    processed: Arc<dyn ProcessedEventStore>,
    ignore_own_events: bool,
    announce_presence: bool,
    lifecycle: Mutex<Lifecycle>,
}

impl Node {
    pub fn new(
        id: NodeId,
        transport: Arc<BusTransport>,
        processed: Arc<dyn ProcessedEventStore>,
    ) -> Self {
        Self {
            identity: Arc::new(NodeIdentity::new(id)),
            transport,
            registry: Arc::new(DispatchRegistry::new()),
            processed,
            ignore_own_events: false,
            announce_presence: true,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Build a node from loaded configuration on top of `broker`.
    pub fn from_config(config: &AppConfig, broker: Arc<dyn Broker>) -> Result<Self, ValidationError> {
        let id = config.node.node_id()?;
        let transport = Arc::new(BusTransport::with_retry_policy(
            broker,
            config.node.topic.clone(),
            config.bus.retry_policy(),
        ));

        let mut processed = RecencyEventStore::new(config.bus.dedup_capacity);
        if config.bus.dedup_ttl_secs > 0 {
            processed = processed.with_ttl(Duration::from_secs(config.bus.dedup_ttl_secs));
        }

        Ok(Self::new(id, transport, Arc::new(processed))
            .ignoring_own_events(config.node.ignore_own_events)
            .announcing_presence(config.features.announce_presence))
    }

    /// Drop envelopes this node published itself.
    pub fn ignoring_own_events(mut self, ignore: bool) -> Self {
        self.ignore_own_events = ignore;
        self
    }

    /// Broadcast join/leave announcements on start and shutdown.
    pub fn announcing_presence(mut self, announce: bool) -> Self {
        self.announce_presence = announce;
        self
    }

    pub fn identity(&self) -> &Arc<NodeIdentity> {
        &self.identity
    }

    pub fn registry(&self) -> &Arc<DispatchRegistry> {
        &self.registry
    }

    pub fn transport(&self) -> &Arc<BusTransport> {
        &self.transport
    }

    pub fn producer(&self) -> Producer {
        Producer::new(Arc::clone(&self.identity), self.transport.clone())
    }

    pub fn consumer(&self) -> Consumer {
        Consumer::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.registry),
            Arc::clone(&self.processed),
        )
        .ignoring_own_events(self.ignore_own_events)
    }

    pub async fn is_started(&self) -> bool {
        self.lifecycle.lock().await.subscription.is_some()
    }

    /// Subscribe this node's consumer to the bus and announce it.
    ///
    /// Calling `start` on a started node returns the existing subscription.
    /// Concurrent callers are serialized, so at most one subscription exists.
    pub async fn start(&self) -> Result<SubscriptionHandle, BusError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(handle) = lifecycle.subscription {
            return Ok(handle);
        }

        let tracker = PresenceTracker::new(Arc::clone(&self.identity));
        let tracker: Arc<dyn EventHandler> = if self.announce_presence {
            Arc::new(tracker.answering_with(self.producer()))
        } else {
            Arc::new(tracker)
        };
        self.registry.register_all(&PRESENCE_EVENTS, Arc::clone(&tracker));

        let handle = match self.transport.subscribe(Arc::new(self.consumer())).await {
            Ok(handle) => handle,
            Err(e) => {
                self.deregister_presence(&tracker);
                return Err(e.into());
            }
        };
        lifecycle.subscription = Some(handle);
        lifecycle.presence = Some(tracker);

        if self.announce_presence {
            self.announce(PRESENCE_JOINED).await?;
        }

        info!(node = %self.identity.id(), topic = self.transport.topic(), "Node started");
        Ok(handle)
    }

    /// Announce departure and stop receiving. Safe to call more than once.
    pub async fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(handle) = lifecycle.subscription.take() else {
            return;
        };

        if self.announce_presence {
            if let Err(e) = self.announce(PRESENCE_LEFT).await {
                warn!(error = %e, "Could not announce departure");
            }
        }

        self.transport.unsubscribe(&handle).await;
        if let Some(tracker) = lifecycle.presence.take() {
            self.deregister_presence(&tracker);
        }
        info!(node = %self.identity.id(), "Node stopped");
    }

    fn deregister_presence(&self, tracker: &Arc<dyn EventHandler>) {
        for event_type in PRESENCE_EVENTS {
            self.registry.deregister(event_type, tracker);
        }
    }

    async fn announce(&self, event_type: &str) -> Result<(), BusError> {
        self.producer()
            .send_event(
                event_type,
                Payload::text(self.identity.id().to_string()),
                None,
            )
            .await?;
        Ok(())
    }
}
