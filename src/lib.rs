pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod presenter;
pub mod server;
pub mod validation;

use std::sync::Arc;

use crate::engine::generator::OpenAiClient;
use crate::error::AppError;

/// Boot the service: config, database, OpenAI client, HTTP server.
pub async fn run() -> Result<(), AppError> {
    logging::init();

    tracing::info!("Starting blueprint-server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env()?;
    let pool = db::init_db(&config.data_dir)?;

    let generator = Arc::new(OpenAiClient::new(
        config.openai_model.clone(),
        config.openai_api_key.clone(),
    ));

    let state = server::AppState { pool, generator };
    server::serve(state, config.bind_addr).await
}
