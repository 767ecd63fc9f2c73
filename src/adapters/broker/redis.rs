//! Redis pub/sub broker for multi-node deployments.
//!
//! Publishing shares one multiplexed connection, opened lazily and dropped
//! after any error so the next publish reconnects. Each subscription holds a
//! dedicated pub/sub connection; its stream ends when that connection dies,
//! which is the transport's cue to re-subscribe.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::RedisConfig;
use crate::domain::foundation::TransportError;
use crate::ports::{Broker, BrokerStream};

/// Redis-backed broker.
pub struct RedisBroker {
    client: redis::Client,
    publisher: Mutex<Option<MultiplexedConnection>>,
    timeout: Duration,
}

impl RedisBroker {
    /// Create a broker for the configured Redis URL.
    ///
    /// No connection is opened until the first publish or subscribe.
    pub fn new(config: &RedisConfig) -> Result<Self, TransportError> {
        let client = redis::Client::open(config.url.as_str()).map_err(classify)?;
        Ok(Self {
            client,
            publisher: Mutex::new(None),
            timeout: config.timeout(),
        })
    }

    async fn publisher_connection(&self) -> Result<MultiplexedConnection, TransportError> {
        let mut guard = self.publisher.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = with_timeout(
            self.timeout,
            "connect",
            self.client.get_multiplexed_async_connection(),
        )
        .await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn reset_publisher(&self) {
        *self.publisher.lock().await = None;
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let mut conn = self.publisher_connection().await?;

        let result: Result<i64, TransportError> =
            with_timeout(self.timeout, "publish", conn.publish(topic, payload)).await;

        match result {
            Ok(receivers) => {
                tracing::trace!(topic, receivers, "Published to Redis");
                Ok(())
            }
            Err(e) => {
                self.reset_publisher().await;
                Err(e)
            }
        }
    }

    async fn subscribe(&self, topic: &str) -> Result<BrokerStream, TransportError> {
        let conn = with_timeout(self.timeout, "connect", self.client.get_async_connection()).await?;

        let mut pubsub = conn.into_pubsub();
        with_timeout(self.timeout, "subscribe", pubsub.subscribe(topic)).await?;
        tracing::debug!(topic, "Subscribed to Redis channel");

        let stream = pubsub
            .into_on_message()
            .map(|msg| msg.get_payload_bytes().to_vec());
        Ok(stream.boxed())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

async fn with_timeout<T, F>(limit: Duration, op: &str, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(classify),
        Err(_) => Err(TransportError::transient(format!(
            "Redis {} timed out after {:?}",
            op, limit
        ))),
    }
}

/// Maps a Redis error onto the transport taxonomy.
fn classify(e: redis::RedisError) -> TransportError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() || e.is_connection_dropped()
    {
        TransportError::transient(e.to_string())
    } else {
        TransportError::unavailable(e.to_string())
    }
}
