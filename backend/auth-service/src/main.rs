use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use lapin::Channel;
use sqlx::postgres::PgPoolOptions;
use sync_fabric::{
    supervise, ChannelHandle, FabricConfig, FabricRole, SyncPublisher,
};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth_service::{config::Config, logging, openapi::ApiDoc, routes, AppState};

/// Publisher-only fabric role: assert the sync exchange and park.
struct AuthFabricRole;

#[async_trait]
impl FabricRole for AuthFabricRole {
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        sync_fabric::topology::declare_sync_exchange(channel).await
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "starting auth-service");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let channel = ChannelHandle::new();
    let publisher = SyncPublisher::new(channel.clone());
    tokio::spawn(supervise(
        FabricConfig::from_env(),
        channel,
        Arc::new(AuthFabricRole),
    ));

    let state = AppState {
        pool,
        publisher,
        jwt_secret: config.jwt_secret.clone(),
    };

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
