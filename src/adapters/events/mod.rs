//! Event bus adapters.
//!
//! - `BusTransport` - Envelope publish/subscribe over a broker, with retry
//!   and reconnect
//! - `RetryPolicy` - Backoff timing for the transport
//! - `RecencyEventStore` - Bounded dedup memory for the consumer

mod recency_store;
mod retry;
mod transport;

pub use recency_store::RecencyEventStore;
pub use retry::RetryPolicy;
pub use transport::{BusTransport, SubscriptionHandle};
