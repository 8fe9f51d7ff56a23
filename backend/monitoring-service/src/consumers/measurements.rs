//! Raw measurement ingestion.
//!
//! Readings arrive on the shared data queue and are folded into hour
//! buckets. Acknowledgment happens only after the bucket write committed,
//! so a crash mid-ingest redelivers the reading instead of losing it.

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, Utc};
use event_schema::Measurement;
use sqlx::PgPool;
use sync_fabric::{Disposition, ProjectionError, QueueHandler};
use tracing::{error, info, warn};

use crate::db::ConsumptionRepo;

/// Truncate a timestamp to the start of its hour. A timestamp that
/// cannot be truncated (out of chrono's range) is used as-is.
pub fn hour_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(chrono::Duration::hours(1)).unwrap_or(ts)
}

pub struct MeasurementIngestor {
    pool: PgPool,
}

impl MeasurementIngestor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueHandler for MeasurementIngestor {
    async fn handle(&self, payload: &[u8]) -> Disposition {
        let measurement: Measurement = match serde_json::from_slice(payload) {
            Ok(measurement) => measurement,
            Err(err) => {
                // Malformed bodies can never succeed; dropping beats
                // wedging the queue.
                warn!(error = %err, "malformed measurement dropped");
                return Disposition::Ack;
            }
        };

        let bucket = hour_bucket(measurement.timestamp);
        let repo = ConsumptionRepo::new(self.pool.clone());
        match repo
            .add_measurement(
                measurement.device_id,
                bucket,
                measurement.measurement_value,
            )
            .await
        {
            Ok(()) => {
                info!(
                    device_id = measurement.device_id,
                    value = measurement.measurement_value,
                    bucket = %bucket,
                    "measurement ingested"
                );
                Disposition::Ack
            }
            Err(err) => match ProjectionError::from(err) {
                // Integrity violations cannot succeed on retry; treat the
                // reading as applied rather than looping forever.
                ProjectionError::AlreadyApplied => {
                    warn!(
                        device_id = measurement.device_id,
                        "measurement hit an integrity violation, acknowledged"
                    );
                    Disposition::Ack
                }
                ProjectionError::Transient(reason) => {
                    error!(
                        device_id = measurement.device_id,
                        error = %reason,
                        "measurement ingest failed, requeueing"
                    );
                    Disposition::Requeue
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncates_to_start_of_hour() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 14, 59, 59).unwrap();
        let bucket = hour_bucket(ts);
        assert_eq!(bucket, Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap());
    }

    #[test]
    fn start_of_hour_is_a_fixed_point() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap();
        assert_eq!(hour_bucket(ts), ts);
    }

    #[test]
    fn readings_across_one_hour_share_a_bucket() {
        let first = Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 5).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 3, 7, 14, 59, 55).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap();
        assert_eq!(hour_bucket(first), hour_bucket(last));
        assert_ne!(hour_bucket(last), hour_bucket(next));
    }
}
