use actix_web::{get, web, HttpResponse};
use chrono::NaiveDate;
use serde_json::json;

use crate::db::{ConsumptionRepo, SyncedDeviceRepo};
use crate::error::AppError;
use crate::models::DailyConsumptionResponse;
use crate::AppState;

type Result<T> = std::result::Result<T, actix_web::Error>;

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Monitoring service is running" }))
}

/// Hourly consumption of one device on one day (YYYY-MM-DD, UTC).
///
/// Hours with no readings are absent from the response rather than
/// returned as zero buckets.
#[utoipa::path(
    get,
    path = "/historical_consumption/{device_id}/{date}",
    params(
        ("device_id" = i64, Path, description = "Device id"),
        ("date" = String, Path, description = "Day in YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Hour buckets for the day", body = DailyConsumptionResponse),
        (status = 400, description = "Unparseable date"),
        (status = 404, description = "Unknown device"),
    ),
    tag = "consumption"
)]
#[get("/historical_consumption/{device_id}/{date}")]
pub async fn historical_consumption(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (device_id, date) = path.into_inner();
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date must be YYYY-MM-DD".into()))?;

    let devices = SyncedDeviceRepo::new(state.pool.clone());
    if !devices.exists(device_id).await.map_err(AppError::from)? {
        return Err(AppError::NotFound("Device not found".into()).into());
    }

    let repo = ConsumptionRepo::new(state.pool.clone());
    let consumption = repo.daily(device_id, date).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(DailyConsumptionResponse {
        device_id,
        date,
        consumption,
    }))
}
