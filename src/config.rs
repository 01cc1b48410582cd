use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration, loaded from environment variables (a `.env` file
/// is honored in dev via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to. `BIND_ADDR`, default 127.0.0.1:8080.
    pub bind_addr: SocketAddr,
    /// Directory holding the SQLite database file. `DATA_DIR`, default ./data.
    pub data_dir: PathBuf,
    /// OpenAI API key. `OPENAI_API_KEY`, required.
    pub openai_api_key: String,
    /// Chat model used for opportunity generation. `OPENAI_MODEL`, default gpt-4o.
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(s) => s
                .parse()
                .map_err(|e| AppError::Config(format!("invalid BIND_ADDR {s:?}: {e}")))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 8080)),
        };

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::Config("OPENAI_API_KEY is not set".into()))?;

        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        Ok(Self {
            bind_addr,
            data_dir,
            openai_api_key,
            openai_model,
        })
    }
}
