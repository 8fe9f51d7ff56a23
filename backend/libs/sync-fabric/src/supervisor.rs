//! Broker connection lifecycle.
//!
//! One supervising task per process: connect, declare the topology for
//! this service's role, hand the live channel to publishers, run the
//! role's consumers, and on any connection-level error start over after a
//! fixed delay. The loop never gives up; a service with no broker simply
//! serves possibly-stale projections until the fabric returns.

use async_trait::async_trait;
use lapin::options::BasicQosOptions;
use lapin::{Channel, Connection, ConnectionProperties};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::FabricError;
use crate::handle::ChannelHandle;

/// Fixed reconnect delay between attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Broker connection settings, read from the environment.
#[derive(Debug, Clone)]
pub struct FabricConfig {
    pub url: String,
}

impl FabricConfig {
    /// `RABBIT_HOST` / `RABBIT_USER` / `RABBIT_PASS`, with the compose
    /// defaults used across the deployment.
    pub fn from_env() -> Self {
        let host = env::var("RABBIT_HOST").unwrap_or_else(|_| "rabbitmq".to_string());
        let user = env::var("RABBIT_USER").unwrap_or_else(|_| "root".to_string());
        let pass = env::var("RABBIT_PASS").unwrap_or_else(|_| "test".to_string());
        Self {
            url: format!("amqp://{user}:{pass}@{host}"),
        }
    }
}

/// What a service does with the fabric: which topology it asserts and
/// which consumers it runs on a live channel.
#[async_trait]
pub trait FabricRole: Send + Sync {
    /// Declare the durable exchanges/queues/bindings this role relies on.
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error>;

    /// Run the role's consumers until a connection-level failure.
    /// Publisher-only roles keep the session parked.
    async fn run(&self, channel: Channel) -> Result<(), FabricError> {
        let _ = channel;
        std::future::pending::<Result<(), FabricError>>().await
    }

    /// One unacknowledged message in flight per consumer; finish or
    /// reject before the broker dispatches the next.
    fn prefetch(&self) -> u16 {
        1
    }
}

/// Supervising loop. Spawn once per process; runs forever.
pub async fn supervise(config: FabricConfig, handle: ChannelHandle, role: Arc<dyn FabricRole>) {
    loop {
        match run_once(&config, &handle, role.as_ref()).await {
            Ok(()) => warn!("fabric session ended without an error, reconnecting"),
            Err(err) => error!(
                error = %err,
                delay_secs = RECONNECT_DELAY.as_secs(),
                "fabric connection lost, reconnecting"
            ),
        }
        handle.clear().await;
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn run_once(
    config: &FabricConfig,
    handle: &ChannelHandle,
    role: &dyn FabricRole,
) -> Result<(), FabricError> {
    let connection = Connection::connect(&config.url, ConnectionProperties::default()).await?;

    // Surface connection-level errors to the select below; publisher-only
    // roles have no consumer stream that would notice the loss otherwise.
    let (error_tx, mut error_rx) = mpsc::channel::<lapin::Error>(1);
    connection.on_error(move |err| {
        let _ = error_tx.try_send(err);
    });

    let channel = connection.create_channel().await?;
    channel
        .basic_qos(role.prefetch(), BasicQosOptions::default())
        .await?;
    role.declare(&channel).await?;
    handle.set(channel.clone()).await;
    info!("connected to fabric, topology declared");

    tokio::select! {
        result = role.run(channel) => result,
        Some(err) = error_rx.recv() => Err(FabricError::Broker(err)),
    }
}
