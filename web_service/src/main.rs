use anyhow::Context;
use dotenv::dotenv;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use db_service::DbService;
use shared_lib::env_utils;
use web_service::{get_main_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("initializing app state ...");

    let db_config = env_utils::get_database_config();
    let db = DbService::connect(&db_config)
        .await
        .context("failed to open database")?;
    db.init_tables().await?;

    let webhook_secret = env_utils::get_webhook_secret();
    if webhook_secret.is_none() {
        tracing::warn!("SHOPIFY_WEBHOOK_SECRET is not set, every webhook will be rejected");
    }

    let port = env_utils::get_port();
    let addr = format!("[::]:{port}")
        .parse::<std::net::SocketAddr>()
        .context("unable to parse address")?;
    let host_uri = env_utils::get_host_uri();

    tracing::info!("Starting server at host: {}", host_uri);

    axum::Server::bind(&addr)
        .serve(get_main_router(AppState::new(db, webhook_secret)).into_make_service())
        .await
        .context("error while starting API server")?;

    Ok(())
}
