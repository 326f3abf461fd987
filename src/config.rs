// src/config.rs

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,

    /// CSV bank paths. When both are set the daily pool is sampled
    /// deterministically from the banks; otherwise questions come from the
    /// remote generator (with the hardcoded fallback set behind it).
    pub aptitude_bank: Option<PathBuf>,
    pub technical_bank: Option<PathBuf>,

    pub openrouter_api_key: Option<String>,
    pub openrouter_api_url: String,
    pub openrouter_model: String,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:quiz.db".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let aptitude_bank = env::var("APTITUDE_BANK").ok().map(PathBuf::from);
        let technical_bank = env::var("TECHNICAL_BANK").ok().map(PathBuf::from);

        let openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();

        let openrouter_api_url = env::var("OPENROUTER_API_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".to_string());

        let openrouter_model = env::var("OPENROUTER_MODEL")
            .unwrap_or_else(|_| "tngtech/deepseek-r1t2-chimera:free".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            bind_addr,
            aptitude_bank,
            technical_bank,
            openrouter_api_key,
            openrouter_api_url,
            openrouter_model,
            rust_log,
        }
    }
}
