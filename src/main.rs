mod api;
mod config;
mod db_utils;
mod error;
mod fhir;
mod graceful_shutdown;
mod models;
mod store;
mod ui;

use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};

use api::AppState;
use config::Config;
use db_utils::{get_pg_connection_pool, init_db};
use fhir::EpicFhirClient;
use graceful_shutdown::wait_for_signal;
use ui::UiSettings;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

    dotenv().ok();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {:#}", err);
        err
    })?;
    info!("veritas-one started with {:?}", config);

    // exhausting the attempts is fatal; the server never starts
    let pg_con_pool = get_pg_connection_pool(
        &config.pg_options,
        config.db_connect_attempts,
        config.db_connect_delay,
        config.db_acquire_timeout,
    )
    .await?;
    init_db(&pg_con_pool).await?;

    let fhir = EpicFhirClient::new(&config.fhir_base_url, &config.fhir_access_token)?;
    let state = AppState {
        pool: pg_con_pool.clone(),
        fhir: Arc::new(fhir),
        ui: UiSettings { ocr_delay: config.ocr_delay },
    };
    let app = api::create_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("\u{1F680} Veritas One API is running at http://{}", config.bind_addr);
    info!("Mock UI at http://{}/ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    pg_con_pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}
