//! Cloud Bus node binary.
//!
//! One process is one node. The same binary plays producer, consumer or both,
//! depending on `CLOUD_BUS__NODE__ID` and the feature flags.

use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cloud_bus::adapters::http::{create_app, BusHandlers};
use cloud_bus::adapters::{InMemoryBroker, RedisBroker};
use cloud_bus::application::handlers::CustomEventLogger;
use cloud_bus::application::{Node, CUSTOM_EVENT};
use cloud_bus::config::{AppConfig, BrokerKind, LogFormat};
use cloud_bus::ports::Broker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server.log_level, config.server.log_format);
    config.validate()?;

    let broker: Arc<dyn Broker> = match config.broker.kind {
        BrokerKind::Memory => Arc::new(InMemoryBroker::new()),
        BrokerKind::Redis => Arc::new(RedisBroker::new(&config.redis)?),
    };

    let node = Arc::new(Node::from_config(&config, broker.clone())?);
    if config.features.log_custom_events {
        node.registry()
            .register(CUSTOM_EVENT, Arc::new(CustomEventLogger::new()));
    }
    node.start().await?;
    info!(
        node = %node.identity().id(),
        broker = broker.name(),
        topic = %config.node.topic,
        "Cloud bus node running"
    );

    if config.features.http_trigger {
        let addr = config.server.socket_addr()?;
        let app = create_app(BusHandlers::for_node(&node), config.server.request_timeout());
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "HTTP trigger listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        shutdown_signal().await;
    }

    node.shutdown().await;
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
