//! PresenceTracker - Keeps the peer directory in step with presence events.
//!
//! Nodes broadcast `bus.node.joined` on start and `bus.node.left` on
//! shutdown. A node that learns about a new peer answers with its own
//! `bus.node.joined` addressed to that peer only, so both sides end up
//! knowing each other. Answers are sent once per newly learned peer, which
//! keeps the exchange finite.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::Producer;
use crate::domain::foundation::{EventEnvelope, HandlerError, Payload};
use crate::domain::node::{Destination, NodeIdentity};
use crate::ports::EventHandler;

pub const PRESENCE_JOINED: &str = "bus.node.joined";
pub const PRESENCE_LEFT: &str = "bus.node.left";

/// Updates `NodeIdentity::peers` from presence announcements.
pub struct PresenceTracker {
    identity: Arc<NodeIdentity>,
    responder: Option<Producer>,
}

impl PresenceTracker {
    /// Track peers without answering announcements.
    pub fn new(identity: Arc<NodeIdentity>) -> Self {
        Self {
            identity,
            responder: None,
        }
    }

    /// Answer newly seen peers with a directed join announcement.
    pub fn answering_with(mut self, producer: Producer) -> Self {
        self.responder = Some(producer);
        self
    }

    async fn answer(&self, peer: &EventEnvelope) -> Result<(), HandlerError> {
        let Some(producer) = &self.responder else {
            return Ok(());
        };
        let destination = Destination::from(peer.origin_service());

        producer
            .send_event(
                PRESENCE_JOINED,
                Payload::text(self.identity.id().to_string()),
                Some(destination),
            )
            .await
            .map_err(|e| HandlerError::new(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for PresenceTracker {
    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
        let peer = event.origin_service();
        if peer == self.identity.id() {
            return Ok(());
        }

        match event.event_type() {
            PRESENCE_JOINED => {
                if self.identity.peers().join(peer.clone()) {
                    info!(peer = %peer, "Peer joined");
                    self.answer(event).await?;
                }
            }
            PRESENCE_LEFT => {
                if self.identity.peers().leave(peer) {
                    info!(peer = %peer, "Peer left");
                }
            }
            other => debug!(event_type = other, "Ignoring non-presence event"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "PresenceTracker"
    }
}
