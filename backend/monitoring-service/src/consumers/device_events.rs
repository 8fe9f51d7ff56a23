//! Projection of device-service events into `synced_devices`.

use async_trait::async_trait;
use event_schema::{DomainEvent, EventDomain};
use sqlx::PgPool;
use sync_fabric::{ProjectionError, SyncProjection};

/// Private durable queue bound to the sync fanout exchange.
pub const SYNC_QUEUE: &str = "monitoring_sync_queue";

pub struct DeviceProjection {
    pool: PgPool,
}

impl DeviceProjection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncProjection for DeviceProjection {
    fn interest(&self) -> EventDomain {
        EventDomain::Device
    }

    async fn apply(&self, event: &DomainEvent) -> Result<(), ProjectionError> {
        let repo = crate::db::SyncedDeviceRepo::new(self.pool.clone());
        match event {
            DomainEvent::DeviceCreated(device) => {
                repo.insert_ignore(device.id, &device.name, device.max_consumption)
                    .await?;
            }
            DomainEvent::DeviceDeleted(device) => {
                repo.delete_with_history(device.id).await?;
            }
            DomainEvent::UserCreated(_)
            | DomainEvent::UserUpdated(_)
            | DomainEvent::UserDeleted(_) => {}
        }
        Ok(())
    }
}
