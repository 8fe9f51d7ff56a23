use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A metered device, optionally assigned to a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub max_consumption: f64,
    pub image_url: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceRequest {
    pub name: Option<String>,
    pub max_consumption: Option<f64>,
    pub image_url: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub max_consumption: Option<f64>,
    pub image_url: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceListResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDeviceResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
