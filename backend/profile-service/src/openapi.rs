/// OpenAPI documentation for the GridPulse profile service.
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridPulse Profile Service API",
        version = "0.1.0",
        description = "User profile store, kept in sync with the auth service through the event fabric.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8002", description = "Development server"),
    ),
    paths(
        crate::handlers::profiles::list_profiles,
        crate::handlers::profiles::get_profile,
        crate::handlers::profiles::create_profile,
        crate::handlers::profiles::update_profile,
        crate::handlers::profiles::delete_profile,
    ),
    components(schemas(
        crate::models::Profile,
        crate::models::UpsertProfileRequest,
        crate::models::ProfileListResponse,
        crate::models::ProfileResponse,
        crate::models::MessageResponse,
    )),
    tags(
        (name = "profiles", description = "User profiles"),
    ),
)]
pub struct ApiDoc;
