use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::models::HourlyConsumption;

#[derive(Clone)]
pub struct ConsumptionRepo {
    pool: PgPool,
}

impl ConsumptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fold one reading into its hour bucket. Insert and accumulate are a
    /// single statement, so concurrent readings for the same bucket never
    /// lose increments.
    pub async fn add_measurement(
        &self,
        device_id: i64,
        bucket_start: DateTime<Utc>,
        value: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO hourly_consumption (device_id, bucket_start, energy_consumed) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (device_id, bucket_start) DO UPDATE \
             SET energy_consumed = hourly_consumption.energy_consumed + EXCLUDED.energy_consumed",
        )
        .bind(device_id)
        .bind(bucket_start)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Hour buckets for one device on one UTC day, in bucket order.
    pub async fn daily(
        &self,
        device_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<HourlyConsumption>, sqlx::Error> {
        let day_start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let day_end = day_start + chrono::Duration::days(1);

        sqlx::query_as::<_, HourlyConsumption>(
            "SELECT bucket_start, energy_consumed FROM hourly_consumption \
             WHERE device_id = $1 AND bucket_start >= $2 AND bucket_start < $3 \
             ORDER BY bucket_start",
        )
        .bind(device_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
    }
}
