mod artwork;
mod config;
mod error;
mod gemini;
mod routes;
mod theme;
mod ui;
mod upload;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let font = artwork::load_serif_font(config.font_path.as_deref())
        .context("the artwork compositor needs a serif font")?;

    let state = Arc::new(AppState {
        gemini: GeminiClient::new(reqwest::Client::new(), config.api_key, config.model),
        font,
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", config.bind_addr))?;

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
