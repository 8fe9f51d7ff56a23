/// OpenAPI documentation for the GridPulse device service.
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridPulse Device Service API",
        version = "0.1.0",
        description = "Device registry and user assignment. Broadcasts device lifecycle events and keeps a local projection of user ids for assignment checks.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8001", description = "Development server"),
    ),
    paths(
        crate::handlers::devices::list_devices,
        crate::handlers::devices::my_devices,
        crate::handlers::devices::get_device,
        crate::handlers::devices::create_device,
        crate::handlers::devices::update_device,
        crate::handlers::devices::delete_device,
    ),
    components(schemas(
        crate::models::Device,
        crate::models::CreateDeviceRequest,
        crate::models::UpdateDeviceRequest,
        crate::models::DeviceListResponse,
        crate::models::CreateDeviceResponse,
        crate::models::MessageResponse,
    )),
    tags(
        (name = "devices", description = "Device registry"),
    ),
)]
pub struct ApiDoc;
