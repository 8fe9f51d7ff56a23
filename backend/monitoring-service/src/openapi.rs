/// OpenAPI documentation for the GridPulse monitoring service.
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridPulse Monitoring Service API",
        version = "0.1.0",
        description = "Energy consumption history. Ingests raw device readings from the data queue into hourly buckets and serves per-day queries.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8003", description = "Development server"),
    ),
    paths(crate::handlers::consumption::historical_consumption),
    components(schemas(
        crate::models::HourlyConsumption,
        crate::models::DailyConsumptionResponse,
    )),
    tags(
        (name = "consumption", description = "Consumption history"),
    ),
)]
pub struct ApiDoc;
