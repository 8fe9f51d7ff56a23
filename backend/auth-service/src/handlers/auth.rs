use actix_web::{get, post, web, HttpResponse};
use event_schema::{DomainEvent, UserPayload};
use request_identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use serde_json::json;
use tracing::info;

use crate::db::UserRepo;
use crate::error::{AppError, Result};
use crate::models::{
    LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse,
};
use crate::security::{jwt, password, AuthUser};
use crate::AppState;

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Auth service is running" }))
}

/// Exchange credentials for a signed token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let username = body
        .username
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username and password are required".into()))?;
    let plain = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username and password are required".into()))?;

    let repo = UserRepo::new(state.pool.clone());
    let account = repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))?;

    if !password::verify_password(plain, &account.password) {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let token = jwt::issue_token(account.id, &account.role, &state.jwt_secret)?;
    info!(user_id = account.id, "user logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".into(),
        user: LoginUser {
            id: account.id,
            role: account.role,
            token,
        },
    }))
}

/// Create a new account. Admin only.
///
/// The profile fields (name, email, avatar) are not stored here; they
/// ride on the USER_CREATED event for the services that project them.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    caller: AuthUser,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    if !caller.is_admin() {
        return Err(AppError::Forbidden);
    }

    let username = body
        .username
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username and password are required".into()))?;
    let plain = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username and password are required".into()))?;
    let role = body.role.as_deref().unwrap_or("client");
    if role != "admin" && role != "client" {
        return Err(AppError::BadRequest("Role must be admin or client".into()));
    }

    let repo = UserRepo::new(state.pool.clone());
    if repo.username_exists(username).await? {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let hash = password::hash_password(plain)?;
    let id = repo.insert(username, &hash, role).await?;
    info!(user_id = id, role, "account created");

    state
        .publisher
        .publish(DomainEvent::UserCreated(UserPayload {
            id,
            role: role.to_owned(),
            name: body.name.clone(),
            email: body.email.clone(),
            avatar_url: body.avatar_url.clone(),
        }))
        .await;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".into(),
        id,
    }))
}

/// Validate the bearer token and echo the caller's identity, both in
/// the body and in headers a reverse proxy can forward downstream.
#[utoipa::path(
    get,
    path = "/verify",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn verify(caller: AuthUser) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((USER_ID_HEADER, caller.user_id.to_string()))
        .insert_header((USER_ROLE_HEADER, caller.role.clone()))
        .json(json!({
            "message": "Token is valid",
            "userId": caller.user_id,
            "role": caller.role,
        }))
}
