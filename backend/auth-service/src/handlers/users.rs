use actix_web::{delete, get, put, web, HttpResponse};
use event_schema::{DomainEvent, EntityRef, UserPayload};
use tracing::info;

use crate::db::UserRepo;
use crate::error::{AppError, Result};
use crate::models::{MessageResponse, UpdateUserRequest};
use crate::security::AuthUser;
use crate::AppState;

/// Fetch one account. Admins can read anyone; clients only themselves.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = crate::models::AccountView),
        (status = 403, description = "Caller may not read this account"),
        (status = 404, description = "No such account"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[get("/user/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    caller: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !caller.is_admin() && caller.user_id != id {
        return Err(AppError::Forbidden);
    }

    let repo = UserRepo::new(state.pool.clone());
    let view = repo
        .find_view_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(view))
}

/// Update an account. Admin only.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such account"),
        (status = 409, description = "Username already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[put("/user/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    caller: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    if !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    let id = path.into_inner();

    let repo = UserRepo::new(state.pool.clone());
    let current = repo
        .find_view_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let username = body
        .username
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&current.username);
    let role = body.role.as_deref().unwrap_or(&current.role);
    if role != "admin" && role != "client" {
        return Err(AppError::BadRequest("Role must be admin or client".into()));
    }
    if username != current.username && repo.username_exists(username).await? {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let hash = match body.password.as_deref().filter(|s| !s.is_empty()) {
        Some(plain) => Some(crate::security::password::hash_password(plain)?),
        None => None,
    };

    let affected = repo.update(id, username, role, hash.as_deref()).await?;
    if affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = id, "account updated");

    state
        .publisher
        .publish(DomainEvent::UserUpdated(UserPayload {
            id,
            role: role.to_owned(),
            name: body.name.clone(),
            email: body.email.clone(),
            avatar_url: body.avatar_url.clone(),
        }))
        .await;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User updated successfully".into(),
    }))
}

/// Delete an account. Admin only.
///
/// The deletion event goes out only after a row was actually removed,
/// so replaying the request cannot fan out spurious deletes.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such account"),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[delete("/user/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    caller: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    let id = path.into_inner();

    let repo = UserRepo::new(state.pool.clone());
    let affected = repo.delete(id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = id, "account deleted");

    state
        .publisher
        .publish(DomainEvent::UserDeleted(EntityRef { id }))
        .await;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
