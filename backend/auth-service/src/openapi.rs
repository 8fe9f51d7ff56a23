use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
/// OpenAPI documentation for the GridPulse auth service.
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridPulse Auth Service API",
        version = "0.1.0",
        description = "Account authentication and management. Issues JWT bearer tokens and broadcasts account lifecycle events to the rest of the platform.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Development server"),
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::verify,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
    ),
    components(schemas(
        crate::models::AccountView,
        crate::models::LoginRequest,
        crate::models::LoginResponse,
        crate::models::LoginUser,
        crate::models::RegisterRequest,
        crate::models::RegisterResponse,
        crate::models::UpdateUserRequest,
        crate::models::MessageResponse,
    )),
    tags(
        (name = "auth", description = "Login, registration, and token checks"),
        (name = "users", description = "Account administration"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
