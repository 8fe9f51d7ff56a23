use actix_web::{delete, get, post, put, web, HttpResponse};
use event_schema::{DevicePayload, DomainEvent, EntityRef};
use request_identity::{RequestIdentity, Role};
use serde_json::json;
use tracing::info;

use crate::db::{DeviceRepo, SyncedUserRepo};
use crate::error::AppError;
use crate::models::{
    CreateDeviceRequest, CreateDeviceResponse, DeviceListResponse, MessageResponse,
    UpdateDeviceRequest,
};
use crate::AppState;

type Result<T> = std::result::Result<T, actix_web::Error>;

/// PUT field semantics: name and max_consumption keep their stored value
/// when omitted or empty, while image_url is replaced by whatever the
/// body carries; omitting it clears the stored image.
fn merge_device_update(
    current: &crate::models::Device,
    body: &UpdateDeviceRequest,
) -> (String, f64, Option<String>) {
    let name = body
        .name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| current.name.clone());
    let max_consumption = body.max_consumption.unwrap_or(current.max_consumption);
    (name, max_consumption, body.image_url.clone())
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Device service is running" }))
}

/// All devices in the fleet. Admin only.
#[utoipa::path(
    get,
    path = "/devices",
    responses(
        (status = 200, description = "Device list", body = DeviceListResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "devices"
)]
#[get("/devices")]
pub async fn list_devices(
    state: web::Data<AppState>,
    identity: RequestIdentity,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;

    let repo = DeviceRepo::new(state.pool.clone());
    let devices = repo.list_all().await.map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(DeviceListResponse { devices }))
}

/// Devices assigned to the calling user.
#[utoipa::path(
    get,
    path = "/my_devices",
    responses(
        (status = 200, description = "Device list", body = DeviceListResponse),
        (status = 401, description = "No user identity on the request"),
    ),
    tag = "devices"
)]
#[get("/my_devices")]
pub async fn my_devices(
    state: web::Data<AppState>,
    identity: RequestIdentity,
) -> Result<HttpResponse> {
    let user_id = identity.require_user_id()?;

    let repo = DeviceRepo::new(state.pool.clone());
    let devices = repo.list_for_user(user_id).await.map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(DeviceListResponse { devices }))
}

/// One device by id. Admins can read any; clients only their own.
#[utoipa::path(
    get,
    path = "/device/{id}",
    params(("id" = i64, Path, description = "Device id")),
    responses(
        (status = 200, description = "Device found", body = crate::models::Device),
        (status = 403, description = "Caller may not read this device"),
        (status = 404, description = "No such device"),
    ),
    tag = "devices"
)]
#[get("/device/{id}")]
pub async fn get_device(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    let repo = DeviceRepo::new(state.pool.clone());
    let device = repo
        .find_by_id(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Device not found".into()))?;

    if identity.role != Role::Admin {
        let caller = identity.require_user_id()?;
        if device.user_id != Some(caller) {
            return Err(actix_web::error::ErrorForbidden("Forbidden"));
        }
    }

    Ok(HttpResponse::Ok().json(device))
}

/// Register a new device. Admin only.
#[utoipa::path(
    post,
    path = "/device",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = CreateDeviceResponse),
        (status = 400, description = "Missing fields or unknown user"),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "devices"
)]
#[post("/device")]
pub async fn create_device(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    body: web::Json<CreateDeviceRequest>,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;

    let name = body
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name and max_consumption are required".into()))?;
    let max_consumption = body
        .max_consumption
        .filter(|v| *v > 0.0)
        .ok_or_else(|| AppError::BadRequest("max_consumption must be positive".into()))?;

    if let Some(user_id) = body.user_id {
        let users = SyncedUserRepo::new(state.pool.clone());
        if !users.exists(user_id).await.map_err(AppError::from)? {
            return Err(AppError::BadRequest("Unknown user".into()).into());
        }
    }

    let repo = DeviceRepo::new(state.pool.clone());
    let id = repo
        .insert(name, max_consumption, body.image_url.as_deref(), body.user_id)
        .await
        .map_err(AppError::from)?;
    info!(device_id = id, "device created");

    state
        .publisher
        .publish(DomainEvent::DeviceCreated(DevicePayload {
            id,
            name: name.to_owned(),
            max_consumption,
        }))
        .await;

    Ok(HttpResponse::Created().json(CreateDeviceResponse {
        message: "Device created successfully".into(),
        id,
    }))
}

/// Update a device, including its user assignment. Admin only.
#[utoipa::path(
    put,
    path = "/device/{id}",
    params(("id" = i64, Path, description = "Device id")),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = MessageResponse),
        (status = 400, description = "Invalid fields or unknown user"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such device"),
    ),
    tag = "devices"
)]
#[put("/device/{id}")]
pub async fn update_device(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
    body: web::Json<UpdateDeviceRequest>,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;
    let id = path.into_inner();

    let repo = DeviceRepo::new(state.pool.clone());
    let current = repo
        .find_by_id(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Device not found".into()))?;

    let (name, max_consumption, image_url) = merge_device_update(&current, &body);
    if max_consumption <= 0.0 {
        return Err(AppError::BadRequest("max_consumption must be positive".into()).into());
    }

    // An explicit user_id must point at a user this service has seen.
    let user_id = match body.user_id {
        Some(user_id) => {
            let users = SyncedUserRepo::new(state.pool.clone());
            if !users.exists(user_id).await.map_err(AppError::from)? {
                return Err(AppError::BadRequest("Unknown user".into()).into());
            }
            Some(user_id)
        }
        None => current.user_id,
    };

    let affected = repo
        .update(id, &name, max_consumption, image_url.as_deref(), user_id)
        .await
        .map_err(AppError::from)?;
    if affected == 0 {
        return Err(AppError::NotFound("Device not found".into()).into());
    }
    info!(device_id = id, "device updated");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Device updated successfully".into(),
    }))
}

/// Remove a device. Admin only.
///
/// The deletion event goes out only after a row was actually removed.
#[utoipa::path(
    delete,
    path = "/device/{id}",
    params(("id" = i64, Path, description = "Device id")),
    responses(
        (status = 200, description = "Device deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such device"),
    ),
    tag = "devices"
)]
#[delete("/device/{id}")]
pub async fn delete_device(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;
    let id = path.into_inner();

    let repo = DeviceRepo::new(state.pool.clone());
    let affected = repo.delete(id).await.map_err(AppError::from)?;
    if affected == 0 {
        return Err(AppError::NotFound("Device not found".into()).into());
    }
    info!(device_id = id, "device deleted");

    state
        .publisher
        .publish(DomainEvent::DeviceDeleted(EntityRef { id }))
        .await;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Device deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Device;
    use chrono::Utc;

    fn stored_device() -> Device {
        Device {
            id: 3,
            name: "Heat pump".to_string(),
            max_consumption: 2.5,
            image_url: Some("https://cdn.example.com/pump.png".to_string()),
            user_id: Some(7),
            created_at: Utc::now(),
        }
    }

    fn empty_body() -> UpdateDeviceRequest {
        UpdateDeviceRequest {
            name: None,
            max_consumption: None,
            image_url: None,
            user_id: None,
        }
    }

    #[test]
    fn omitted_image_url_clears_the_stored_image() {
        let (_, _, image_url) = merge_device_update(&stored_device(), &empty_body());
        assert_eq!(image_url, None);
    }

    #[test]
    fn provided_image_url_replaces_the_stored_image() {
        let body = UpdateDeviceRequest {
            image_url: Some("https://cdn.example.com/new.png".to_string()),
            ..empty_body()
        };
        let (_, _, image_url) = merge_device_update(&stored_device(), &body);
        assert_eq!(image_url.as_deref(), Some("https://cdn.example.com/new.png"));
    }

    #[test]
    fn omitted_or_empty_name_keeps_the_stored_name() {
        let (name, max, _) = merge_device_update(&stored_device(), &empty_body());
        assert_eq!(name, "Heat pump");
        assert!((max - 2.5).abs() < f64::EPSILON);

        let body = UpdateDeviceRequest {
            name: Some(String::new()),
            ..empty_body()
        };
        let (name, _, _) = merge_device_update(&stored_device(), &body);
        assert_eq!(name, "Heat pump");
    }
}
