//! Bounded recency set of dispatched event ids.
//!
//! Remembers at most `capacity` ids, and optionally forgets ids older than
//! `ttl`. The oldest id is evicted first. This bounds memory while still
//! catching the duplicates produced by publish retries, which arrive close
//! together.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::foundation::EventId;
use crate::ports::ProcessedEventStore;

#[derive(Default)]
struct Window {
    order: VecDeque<(EventId, Instant)>,
    seen: HashSet<EventId>,
}

impl Window {
    fn expire(&mut self, now: Instant, ttl: Option<Duration>) {
        let Some(ttl) = ttl else { return };
        while let Some((_, seen_at)) = self.order.front() {
            if now.duration_since(*seen_at) < ttl {
                break;
            }
            if let Some((id, _)) = self.order.pop_front() {
                self.seen.remove(&id);
            }
        }
    }

    fn trim_to(&mut self, capacity: usize) {
        while self.order.len() > capacity {
            if let Some((id, _)) = self.order.pop_front() {
                self.seen.remove(&id);
            }
        }
    }
}

/// In-memory `ProcessedEventStore` with bounded size.
pub struct RecencyEventStore {
    window: Mutex<Window>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl RecencyEventStore {
    /// Remembers the last `capacity` ids (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            window: Mutex::new(Window::default()),
            capacity: capacity.max(1),
            ttl: None,
        }
    }

    /// Also forget ids once they are older than `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl ProcessedEventStore for RecencyEventStore {
    async fn insert_if_absent(&self, event_id: &EventId) -> bool {
        let now = Instant::now();
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.expire(now, self.ttl);

        if !window.seen.insert(event_id.clone()) {
            return false;
        }
        window.order.push_back((event_id.clone(), now));
        window.trim_to(self.capacity);
        true
    }

    async fn contains(&self, event_id: &EventId) -> bool {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.expire(Instant::now(), self.ttl);
        window.seen.contains(event_id)
    }

    async fn len(&self) -> usize {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.expire(Instant::now(), self.ttl);
        window.order.len()
    }
}
