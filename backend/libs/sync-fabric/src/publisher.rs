//! Fire-and-forget publish side of the fabric.

use event_schema::{DomainEvent, Measurement, SyncEvent};
use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use tracing::{error, info};

use crate::handle::ChannelHandle;
use crate::topology;

/// AMQP delivery mode 2: persist the message to disk on the broker.
const PERSISTENT: u8 = 2;

/// Publishes sync events to the fanout exchange.
///
/// Publish is best-effort: with no open channel the event is logged and
/// dropped, and the caller gets no signal. A write committed locally but
/// published during an outage is therefore silently missing from every
/// projection until the entity changes again. Callers are expected to
/// publish only after their own commit succeeded.
#[derive(Clone)]
pub struct SyncPublisher {
    channel: ChannelHandle,
}

impl SyncPublisher {
    pub fn new(channel: ChannelHandle) -> Self {
        Self { channel }
    }

    pub async fn publish(&self, event: DomainEvent) {
        let envelope = SyncEvent::new(event);
        let payload = match serde_json::to_vec(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to serialize sync event, dropped");
                return;
            }
        };

        let Some(channel) = self.channel.get().await else {
            error!(
                event_type = envelope.event.tag(),
                entity_id = envelope.event.entity_id(),
                "sync channel not available, event dropped"
            );
            return;
        };

        let published = channel
            .basic_publish(
                topology::SYNC_EXCHANGE,
                "",
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(PERSISTENT),
            )
            .await;

        match published {
            Ok(_) => info!(
                event_type = envelope.event.tag(),
                entity_id = envelope.event.entity_id(),
                "sync event published"
            ),
            Err(err) => error!(
                event_type = envelope.event.tag(),
                entity_id = envelope.event.entity_id(),
                error = %err,
                "failed to publish sync event, dropped"
            ),
        }
    }
}

/// Publishes raw measurements to the data queue via the default exchange.
/// Same best-effort semantics as [`SyncPublisher`].
#[derive(Clone)]
pub struct MeasurementPublisher {
    channel: ChannelHandle,
}

impl MeasurementPublisher {
    pub fn new(channel: ChannelHandle) -> Self {
        Self { channel }
    }

    pub async fn publish(&self, measurement: &Measurement) {
        let payload = match serde_json::to_vec(measurement) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to serialize measurement, dropped");
                return;
            }
        };

        let Some(channel) = self.channel.get().await else {
            error!(
                device_id = measurement.device_id,
                "data channel not available, measurement dropped"
            );
            return;
        };

        let published = channel
            .basic_publish(
                "",
                topology::DATA_QUEUE,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(PERSISTENT),
            )
            .await;

        match published {
            Ok(_) => info!(
                device_id = measurement.device_id,
                value = measurement.measurement_value,
                "measurement published"
            ),
            Err(err) => error!(
                device_id = measurement.device_id,
                error = %err,
                "failed to publish measurement, dropped"
            ),
        }
    }
}
