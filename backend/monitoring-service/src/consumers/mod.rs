mod device_events;
mod measurements;

pub use device_events::{DeviceProjection, SYNC_QUEUE};
pub use measurements::{hour_bucket, MeasurementIngestor};

use async_trait::async_trait;
use lapin::Channel;
use sqlx::PgPool;
use std::sync::Arc;
use sync_fabric::{run_consumer, topology, FabricError, FabricRole, SyncProjector};

/// Fabric role for this service: consume device sync events and raw
/// measurements on the same channel.
pub struct MonitoringFabricRole {
    pool: PgPool,
}

impl MonitoringFabricRole {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FabricRole for MonitoringFabricRole {
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        topology::declare_sync_queue(channel, SYNC_QUEUE).await?;
        topology::declare_data_queue(channel).await
    }

    async fn run(&self, channel: Channel) -> Result<(), FabricError> {
        let projector = Arc::new(SyncProjector::new(DeviceProjection::new(self.pool.clone())));
        let ingestor = Arc::new(MeasurementIngestor::new(self.pool.clone()));

        // Either consumer dying means the session is no longer whole;
        // let the supervisor rebuild both.
        futures::try_join!(
            run_consumer(&channel, SYNC_QUEUE, "monitoring-service", projector),
            run_consumer(
                &channel,
                topology::DATA_QUEUE,
                "monitoring-service-data",
                ingestor
            ),
        )?;
        Ok(())
    }
}
