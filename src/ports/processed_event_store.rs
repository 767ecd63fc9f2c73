//! ProcessedEventStore port - Interface for tracking seen envelopes.
//!
//! The transport delivers at-least-once, so the same envelope may arrive
//! more than once after a retried publish. The consumer consults this store
//! before dispatching and skips ids it has already seen.
//!
//! Implementations only need to remember *recent* ids; an id that has aged
//! out may be dispatched again.

use async_trait::async_trait;

use crate::domain::foundation::EventId;

/// Port for remembering which envelopes were already dispatched.
///
/// # Example
///
/// ```ignore
/// if !store.insert_if_absent(envelope.event_id()).await {
///     return; // Skip duplicate
/// }
/// registry.dispatch(&envelope).await;
/// ```
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Records `event_id`. Returns `true` if it was not seen before.
    ///
    /// Must be atomic: of two concurrent calls with the same id, exactly
    /// one returns `true`.
    async fn insert_if_absent(&self, event_id: &EventId) -> bool;

    /// Returns `true` if `event_id` is currently remembered.
    async fn contains(&self, event_id: &EventId) -> bool;

    /// Number of ids currently remembered.
    async fn len(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ProcessedEventStore) {}
}
