//! Process-wide node identity and the live peer directory.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use super::address::{is_addressed_to, Destination, NodeId};

/// Known peer ids, updated as nodes join and leave.
///
/// Best-effort: a peer that never announced itself is simply absent.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: RwLock<HashSet<NodeId>>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a peer. Returns true if it was not known yet.
    pub fn join(&self, peer: NodeId) -> bool {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(peer)
    }

    /// Forgets a peer. Returns true if it was known.
    pub fn leave(&self, peer: &NodeId) -> bool {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(peer)
    }

    pub fn contains(&self, peer: &NodeId) -> bool {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(peer)
    }

    /// True if any known peer matches the destination.
    pub fn any_matches(&self, destination: &Destination) -> bool {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|peer| destination.matches(peer))
    }

    /// Sorted snapshot of the known peers.
    pub fn snapshot(&self) -> Vec<NodeId> {
        let mut peers: Vec<NodeId> = self
            .peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        peers.sort_by_key(|p| p.to_string());
        peers
    }

    pub fn len(&self) -> usize {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// This node's own id plus what it knows about the rest of the cluster.
#[derive(Debug)]
pub struct NodeIdentity {
    id: NodeId,
    peers: PeerDirectory,
}

impl NodeIdentity {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            peers: PeerDirectory::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    /// Addressing filter applied to every inbound envelope.
    pub fn accepts(&self, destination: Option<&Destination>) -> bool {
        is_addressed_to(destination, &self.id)
    }

    /// True if the destination matches this node or any known peer.
    pub fn is_reachable(&self, destination: &Destination) -> bool {
        destination.matches(&self.id) || self.peers.any_matches(destination)
    }
}
