use actix_web::{delete, get, post, put, web, HttpResponse};
use request_identity::{RequestIdentity, Role};
use serde_json::json;
use tracing::info;

use crate::db::ProfileRepo;
use crate::error::AppError;
use crate::models::{
    MessageResponse, ProfileListResponse, ProfileResponse, UpsertProfileRequest,
};
use crate::AppState;

type Result<T> = std::result::Result<T, actix_web::Error>;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().is_some_and(|c| c == "23505"))
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Profile service is running" }))
}

/// All profiles. Admin only.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Profile list", body = ProfileListResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "profiles"
)]
#[get("/users")]
pub async fn list_profiles(
    state: web::Data<AppState>,
    identity: RequestIdentity,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;

    let repo = ProfileRepo::new(state.pool.clone());
    let users = repo.list_all().await.map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ProfileListResponse { users }))
}

/// One profile. Admins can read anyone; clients only themselves.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 403, description = "Caller may not read this profile"),
        (status = 404, description = "No such profile"),
    ),
    tag = "profiles"
)]
#[get("/user/{id}")]
pub async fn get_profile(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if identity.role != Role::Admin && identity.user_id != Some(user_id) {
        return Err(actix_web::error::ErrorForbidden("Forbidden"));
    }

    let repo = ProfileRepo::new(state.pool.clone());
    let user = repo
        .find_by_id(user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(ProfileResponse { user }))
}

/// Create a profile out of band. Admin only.
///
/// Profiles normally arrive through the sync fabric; this exists for
/// repair and backfill.
#[utoipa::path(
    post,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpsertProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Profile already exists"),
    ),
    tag = "profiles"
)]
#[post("/user/{id}")]
pub async fn create_profile(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
    body: web::Json<UpsertProfileRequest>,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;
    let user_id = path.into_inner();

    let repo = ProfileRepo::new(state.pool.clone());
    repo.insert(
        user_id,
        body.name.as_deref(),
        body.email.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            actix_web::Error::from(AppError::Conflict("User already exists".into()))
        } else {
            AppError::from(err).into()
        }
    })?;
    info!(user_id, "profile created");

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "User created successfully".into(),
    }))
}

/// Update a profile. Admins can update anyone; clients only themselves.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 403, description = "Caller may not update this profile"),
        (status = 404, description = "No such profile"),
    ),
    tag = "profiles"
)]
#[put("/user/{id}")]
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
    body: web::Json<UpsertProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if identity.role != Role::Admin && identity.user_id != Some(user_id) {
        return Err(actix_web::error::ErrorForbidden("Forbidden"));
    }

    let repo = ProfileRepo::new(state.pool.clone());
    let current = repo
        .find_by_id(user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let name = body.name.clone().or(current.name);
    let email = body.email.clone().or(current.email);
    let avatar_url = body.avatar_url.clone().or(current.avatar_url);

    repo.update(
        user_id,
        name.as_deref(),
        email.as_deref(),
        avatar_url.as_deref(),
    )
    .await
    .map_err(AppError::from)?;
    info!(user_id, "profile updated");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User updated successfully".into(),
    }))
}

/// Delete a profile. Admin only.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such profile"),
    ),
    tag = "profiles"
)]
#[delete("/user/{id}")]
pub async fn delete_profile(
    state: web::Data<AppState>,
    identity: RequestIdentity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    identity.require_role(Role::Admin)?;
    let user_id = path.into_inner();

    let repo = ProfileRepo::new(state.pool.clone());
    let affected = repo.delete(user_id).await.map_err(AppError::from)?;
    if affected == 0 {
        return Err(AppError::NotFound("User not found".into()).into());
    }
    info!(user_id, "profile deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
