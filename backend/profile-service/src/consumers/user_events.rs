//! Projection of auth-service user events into the local profile store.

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
pub const SYNC_QUEUE: &str = "profile_service_sync_queue";

pub struct ProfileProjection {
    pool: PgPool,
}

impl ProfileProjection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncProjection for ProfileProjection {
    fn interest(&self) -> EventDomain {
        EventDomain::User
    }

    async fn apply(&self, event: &DomainEvent) -> Result<(), ProjectionError> {
        let repo = crate::db::ProfileRepo::new(self.pool.clone());
        match event {
            DomainEvent::UserCreated(user) => {
                repo.insert_ignore(
                    user.id,
                    user.name.as_deref(),
                    user.email.as_deref(),
                    user.avatar_url.as_deref(),
                )
                .await?;
            }
            // Overwrite only an existing row. Zero rows affected means
            // the profile was never created here or was already deleted;
            // either way the update is a no-op, not an insert.
            DomainEvent::UserUpdated(user) => {
                repo.update(
                    user.id,
                    user.name.as_deref(),
                    user.email.as_deref(),
                    user.avatar_url.as_deref(),
                )
                .await?;
            }
            DomainEvent::UserDeleted(user) => {
                repo.delete(user.id).await?;
            }
            DomainEvent::DeviceCreated(_) | DomainEvent::DeviceDeleted(_) => {}
        }
        Ok(())
    }
}

/// Consumer-only fabric role for this service.
pub struct ProfileFabricRole {
    pool: PgPool,
}

impl ProfileFabricRole {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FabricRole for ProfileFabricRole {
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        topology::declare_sync_queue(channel, SYNC_QUEUE).await
    }

    async fn run(&self, channel: Channel) -> Result<(), FabricError> {
        let handler = Arc::new(SyncProjector::new(ProfileProjection::new(self.pool.clone())));
        run_consumer(&channel, SYNC_QUEUE, "profile-service", handler).await
    }
}
