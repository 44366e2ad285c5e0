use std::path::PathBuf;

use anyhow::Context;

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is honored when present).
pub struct Config {
    pub api_key: String,
    pub bind_addr: String,
    pub model: String,
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key =
            std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set (see .env.example)")?;

        Ok(Self {
            api_key,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_owned()),
            font_path: std::env::var_os("POEM_FONT_PATH").map(PathBuf::from),
        })
    }
}
