mod app;
mod doc;
mod dtos;
mod error;
mod routes;
mod state;
mod utils;

use crate::{state::AppState, utils::shutdown::shutdown_signal};
use database::{
    config::StoreConfig, db::create_connection, services::coordinator::MutationCoordinator,
};
use log::{error, info};
use std::{env, process::ExitCode};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    let db = create_connection(&config).await?;
    info!(
        "Connected to the store (max {} connections, mutation timeout {:?}, isolation {:?})",
        config.max_connections, config.mutation_timeout, config.isolation
    );

    let coordinator = MutationCoordinator::new(db.clone(), &config);
    let app = app::router(AppState { db, coordinator });

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Running axum on http://{bind_addr} (docs at /swagger-ui)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
