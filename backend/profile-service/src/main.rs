use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sync_fabric::{supervise, ChannelHandle, FabricConfig};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use profile_service::{
    config::Config, consumers::ProfileFabricRole, logging, openapi::ApiDoc, routes, AppState,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "starting profile-service");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Consumer-only role; the handle is unused by handlers but still
    // tracks connection state for the supervisor.
    let channel = ChannelHandle::new();
    tokio::spawn(supervise(
        FabricConfig::from_env(),
        channel,
        Arc::new(ProfileFabricRole::new(pool.clone())),
    ));

    let state = AppState { pool };

    let frontend_origin = config.frontend_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs.json", ApiDoc::openapi()),
            )
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await?;

    Ok(())
}
