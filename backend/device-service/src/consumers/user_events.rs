//! Projection of auth-service user events into `synced_users`.

use async_trait::async_trait;
use event_schema::{DomainEvent, EventDomain};
use lapin::Channel;
use sqlx::PgPool;
use std::sync::Arc;
use sync_fabric::{
    run_consumer, topology, FabricError, FabricRole, ProjectionError, SyncProjection,
    SyncProjector,
};

/// Private durable queue bound to the sync fanout exchange.
pub const SYNC_QUEUE: &str = "device_service_sync_queue";

pub struct UserProjection {
    pool: PgPool,
}

impl UserProjection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncProjection for UserProjection {
    fn interest(&self) -> EventDomain {
        EventDomain::User
    }

    async fn apply(&self, event: &DomainEvent) -> Result<(), ProjectionError> {
        let repo = crate::db::SyncedUserRepo::new(self.pool.clone());
        match event {
            // Updates can arrive before the create was seen; both upsert.
            DomainEvent::UserCreated(user) | DomainEvent::UserUpdated(user) => {
                repo.insert_ignore(user.id).await?;
            }
            DomainEvent::UserDeleted(user) => {
                repo.delete(user.id).await?;
            }
            DomainEvent::DeviceCreated(_) | DomainEvent::DeviceDeleted(_) => {}
        }
        Ok(())
    }
}

/// Fabric role for this service: publish device events, consume user events.
pub struct DeviceFabricRole {
    pool: PgPool,
}

impl DeviceFabricRole {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FabricRole for DeviceFabricRole {
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        topology::declare_sync_queue(channel, SYNC_QUEUE).await
    }

    async fn run(&self, channel: Channel) -> Result<(), FabricError> {
        let handler = Arc::new(SyncProjector::new(UserProjection::new(self.pool.clone())));
        run_consumer(&channel, SYNC_QUEUE, "device-service", handler).await
    }
}
