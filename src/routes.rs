//! HTTP surface: router, multipart handling and the three API operations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ab_glyph::FontVec;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{PoetError, PoetResult};
use crate::gemini::{GeminiClient, ImageAnalysis};
use crate::theme::Theme;
use crate::{artwork, ui, upload};

pub struct AppState {
    pub gemini: GeminiClient,
    pub font: FontVec,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/api/analyze", post(analyze))
        .route("/api/poem", post(poem))
        .route("/api/artwork", post(artwork_png))
        // Above the 5MB validation limit so oversized uploads reach our own
        // check and get a descriptive message instead of a bare 413.
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Collected multipart form: the `image` file plus named text fields.
#[derive(Default)]
struct FormFields {
    image: Option<Bytes>,
    text: HashMap<String, String>,
}

impl FormFields {
    fn image(&self) -> PoetResult<&[u8]> {
        self.image
            .as_deref()
            .ok_or_else(|| PoetError::invalid_input("missing image field"))
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }
}

async fn collect_fields(multipart: &mut Multipart) -> PoetResult<FormFields> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PoetError::invalid_input(format!("malformed multipart request: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "image" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PoetError::invalid_input(format!("could not read upload: {e}")))?;
            fields.image = Some(bytes);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| PoetError::invalid_input(format!("could not read field {name}: {e}")))?;
            fields.text.insert(name, value);
        }
    }

    Ok(fields)
}

#[derive(Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    analysis: ImageAnalysis,
    summary: String,
    elapsed_ms: u128,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> PoetResult<Json<AnalyzeResponse>> {
    let start = Instant::now();
    let fields = collect_fields(&mut multipart).await?;
    let image = fields.image()?;
    let language = fields.text("language").unwrap_or("English");

    upload::validate_upload(image)?;
    let image_b64 = upload::to_jpeg_base64(image)?;

    let analysis = state.gemini.analyze_image(&image_b64, language).await?;
    let summary = analysis.summary();

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis(),
        objects = analysis.objects.len(),
        themes = analysis.themes.len(),
        "image analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis,
        summary,
        elapsed_ms: start.elapsed().as_millis(),
    }))
}

#[derive(Serialize)]
struct PoemResponse {
    poem: String,
    style: String,
    elapsed_ms: u128,
}

async fn poem(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> PoetResult<Json<PoemResponse>> {
    let start = Instant::now();
    let fields = collect_fields(&mut multipart).await?;
    let image = fields.image()?;
    let style = fields.text("style").unwrap_or("Free Verse");
    let language = fields.text("language").unwrap_or("English");
    let analysis = fields
        .text("analysis")
        .ok_or_else(|| PoetError::invalid_input("missing analysis field"))?;

    upload::validate_upload(image)?;
    let image_b64 = upload::to_jpeg_base64(image)?;

    let poem = state
        .gemini
        .generate_poem(&image_b64, style, language, analysis)
        .await?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis(),
        style,
        "poem generated"
    );

    Ok(Json(PoemResponse {
        poem,
        style: style.to_owned(),
        elapsed_ms: start.elapsed().as_millis(),
    }))
}

async fn artwork_png(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> PoetResult<impl IntoResponse> {
    let fields = collect_fields(&mut multipart).await?;
    let image = fields
        .image
        .clone()
        .ok_or_else(|| PoetError::invalid_input("missing image field"))?;
    let poem = fields.text("poem").unwrap_or_default().to_owned();
    let style = fields.text("style").unwrap_or("Free Verse").to_owned();
    let theme = Theme::resolve(fields.text("background"), fields.text("foreground"));

    upload::validate_upload(&image)?;

    // Compositing is pure CPU work; keep it off the async workers.
    let artifact = tokio::task::spawn_blocking(move || {
        artwork::compose(&image, &poem, &style, &theme, &state.font)
    })
    .await
    .map_err(|e| PoetError::surface(format!("render task failed: {e}")))??;

    tracing::info!(file_name = %artifact.file_name, bytes = artifact.png.len(), "artwork rendered");

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.png,
    ))
}
