//! Durable topology declarations.
//!
//! Names here are the wire contract shared with every deployed service;
//! rename them only alongside a coordinated redeploy.

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};

/// Fanout exchange carrying all `USER_*` / `DEVICE_*` sync events.
pub const SYNC_EXCHANGE: &str = "sync_events_exchange";

/// Point-to-point queue carrying raw device measurements. Shared between
/// monitoring instances as a competing-consumer queue.
pub const DATA_QUEUE: &str = "device_data_queue";

fn durable_queue() -> QueueDeclareOptions {
    QueueDeclareOptions {
        durable: true,
        ..Default::default()
    }
}

/// Assert the sync fanout exchange. Publishers call this so an event can
/// never be dropped for lack of a destination.
pub async fn declare_sync_exchange(channel: &Channel) -> Result<(), lapin::Error> {
    channel
        .exchange_declare(
            SYNC_EXCHANGE,
            ExchangeKind::Fanout,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
}

/// Assert a service-private durable queue and bind it to the sync
/// exchange with an empty routing key (pure broadcast; filtering happens
/// in the consumer).
pub async fn declare_sync_queue(channel: &Channel, queue: &str) -> Result<(), lapin::Error> {
    declare_sync_exchange(channel).await?;
    channel
        .queue_declare(queue, durable_queue(), FieldTable::default())
        .await?;
    channel
        .queue_bind(
            queue,
            SYNC_EXCHANGE,
            "",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
}

/// Assert the raw measurement queue.
pub async fn declare_data_queue(channel: &Channel) -> Result<(), lapin::Error> {
    channel
        .queue_declare(DATA_QUEUE, durable_queue(), FieldTable::default())
        .await?;
    Ok(())
}
