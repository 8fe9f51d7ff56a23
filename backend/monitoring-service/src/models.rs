use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One hour bucket of accumulated consumption for a device.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct HourlyConsumption {
    pub bucket_start: DateTime<Utc>,
    pub energy_consumed: f64,
}

/// Response for the historical consumption query.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyConsumptionResponse {
    #[serde(rename = "deviceId")]
    pub device_id: i64,
    pub date: NaiveDate,
    pub consumption: Vec<HourlyConsumption>,
}
