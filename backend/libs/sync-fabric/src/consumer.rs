//! Delivery loop and the ack/requeue discipline.

use async_trait::async_trait;
use event_schema::{DomainEvent, EventDomain, SyncEvent};
use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions};
use lapin::types::FieldTable;
use lapin::Channel;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{FabricError, ProjectionError};

/// Fate of a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Done with this message, permanently.
    Ack,
    /// Put it back on the queue for another attempt.
    Requeue,
}

/// Handles one raw delivery payload. Implementations must be idempotent:
/// at-least-once delivery means any payload can be seen twice.
#[async_trait]
pub trait QueueHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Disposition;
}

/// Consume `queue` until the underlying stream dies, acknowledging each
/// delivery according to the handler's verdict. Acknowledgment happens
/// strictly after the handler returns, so a crash mid-handling leaves the
/// message unacknowledged and redeliverable.
pub async fn run_consumer(
    channel: &Channel,
    queue: &str,
    consumer_tag: &str,
    handler: Arc<dyn QueueHandler>,
) -> Result<(), FabricError> {
    let mut deliveries = channel
        .basic_consume(
            queue,
            consumer_tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!(queue, consumer_tag, "consumer started");

    while let Some(delivery) = deliveries.next().await {
        let delivery = delivery?;
        match handler.handle(&delivery.data).await {
            Disposition::Ack => delivery.ack(BasicAckOptions::default()).await?,
            Disposition::Requeue => {
                delivery
                    .nack(BasicNackOptions {
                        requeue: true,
                        ..Default::default()
                    })
                    .await?
            }
        }
    }

    Err(FabricError::StreamEnded(queue.to_string()))
}

/// A service-local projection of foreign entities, fed by sync events.
#[async_trait]
pub trait SyncProjection: Send + Sync {
    /// The entity family this projection cares about. Events outside it
    /// are acknowledged without any local write.
    fn interest(&self) -> EventDomain;

    /// Apply one event to the local store. Must be idempotent; duplicate
    /// application surfaces as [`ProjectionError::AlreadyApplied`].
    async fn apply(&self, event: &DomainEvent) -> Result<(), ProjectionError>;
}

/// Adapter running a [`SyncProjection`] against the sync queue: parses the
/// envelope, filters by interest, and maps projection failures onto the
/// ack/requeue discipline.
///
/// A transient store failure keeps the message on the queue with no retry
/// ceiling; a message failing for a non-transient, non-integrity reason
/// will loop forever (known poison-message gap, no dead-letter policy).
pub struct SyncProjector<P> {
    projection: P,
}

impl<P> SyncProjector<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }
}

#[async_trait]
impl<P: SyncProjection> QueueHandler for SyncProjector<P> {
    async fn handle(&self, payload: &[u8]) -> Disposition {
        let envelope: SyncEvent = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                // Malformed bodies can never succeed; dropping beats
                // wedging the queue.
                warn!(error = %err, "malformed sync event dropped");
                return Disposition::Ack;
            }
        };

        if envelope.event.domain() != self.projection.interest() {
            return Disposition::Ack;
        }

        match self.projection.apply(&envelope.event).await {
            Ok(()) => {
                info!(
                    event_type = envelope.event.tag(),
                    entity_id = envelope.event.entity_id(),
                    "sync event applied"
                );
                Disposition::Ack
            }
            Err(ProjectionError::AlreadyApplied) => {
                debug!(
                    event_type = envelope.event.tag(),
                    entity_id = envelope.event.entity_id(),
                    "projection already applied, acknowledging"
                );
                Disposition::Ack
            }
            Err(ProjectionError::Transient(reason)) => {
                error!(
                    event_type = envelope.event.tag(),
                    entity_id = envelope.event.entity_id(),
                    error = %reason,
                    "projection failed, requeueing"
                );
                Disposition::Requeue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_schema::{EntityRef, UserPayload};
    use std::sync::Mutex;

    struct RecordingProjection {
        applied: Mutex<Vec<i64>>,
        fail_with: Mutex<Option<ProjectionError>>,
    }

    impl RecordingProjection {
        fn new() -> Self {
            Self {
                applied: Mutex::new(Vec::new()),
                fail_with: Mutex::new(None),
            }
        }

        fn fail_next(&self, err: ProjectionError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn applied_ids(&self) -> Vec<i64> {
            self.applied.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SyncProjection for &RecordingProjection {
        fn interest(&self) -> EventDomain {
            EventDomain::User
        }

        async fn apply(&self, event: &DomainEvent) -> Result<(), ProjectionError> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            self.applied.lock().unwrap().push(event.entity_id());
            Ok(())
        }
    }

    fn user_created(id: i64) -> Vec<u8> {
        let event = SyncEvent::new(DomainEvent::UserCreated(UserPayload {
            id,
            role: "client".to_string(),
            name: None,
            email: None,
            avatar_url: None,
        }));
        serde_json::to_vec(&event).unwrap()
    }

    fn device_deleted(id: i64) -> Vec<u8> {
        let event = SyncEvent::new(DomainEvent::DeviceDeleted(EntityRef { id }));
        serde_json::to_vec(&event).unwrap()
    }

    #[tokio::test]
    async fn matching_event_is_applied_and_acked() {
        let projection = RecordingProjection::new();
        let projector = SyncProjector::new(&projection);

        let disposition = projector.handle(&user_created(5)).await;

        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(projection.applied_ids(), vec![5]);
    }

    #[tokio::test]
    async fn foreign_domain_is_acked_without_side_effect() {
        let projection = RecordingProjection::new();
        let projector = SyncProjector::new(&projection);

        let disposition = projector.handle(&device_deleted(9)).await;

        assert_eq!(disposition, Disposition::Ack);
        assert!(projection.applied_ids().is_empty());
    }

    #[tokio::test]
    async fn duplicate_application_is_treated_as_success() {
        let projection = RecordingProjection::new();
        projection.fail_next(ProjectionError::AlreadyApplied);
        let projector = SyncProjector::new(&projection);

        let disposition = projector.handle(&user_created(5)).await;

        assert_eq!(disposition, Disposition::Ack);
    }

    #[tokio::test]
    async fn transient_failure_requeues_until_it_clears() {
        let projection = RecordingProjection::new();
        projection.fail_next(ProjectionError::Transient("db down".to_string()));
        let projector = SyncProjector::new(&projection);

        assert_eq!(projector.handle(&user_created(5)).await, Disposition::Requeue);
        // The store recovered; redelivery now lands.
        assert_eq!(projector.handle(&user_created(5)).await, Disposition::Ack);
        assert_eq!(projection.applied_ids(), vec![5]);
    }

    #[tokio::test]
    async fn malformed_body_is_dropped() {
        let projection = RecordingProjection::new();
        let projector = SyncProjector::new(&projection);

        let disposition = projector.handle(b"{not json").await;

        assert_eq!(disposition, Disposition::Ack);
        assert!(projection.applied_ids().is_empty());
    }
}
