//! Gallery HTTP server
//!
//! Routes:
//! - GET  /                 - Gallery page (query: file, types, example)
//! - GET  /api/health       - Liveness check
//! - GET  /api/targets      - Selectable dataset files
//! - GET  /api/examples     - Example ids of a split (query: file, types)
//! - POST /api/highlight    - Entity highlight page for a `{text, ents}` document
//!
//! Dataset reads are synchronous, so every render pass runs on the blocking
//! pool. Each request is an independent top-to-bottom render.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::browser::{DatasetBrowser, Target, KEY_FILE, KEY_TYPES};
use crate::error::GalleryError;
use crate::highlight::{ColorSpec, EntityDoc, EntityHighlighter, EntitySpan};
use crate::surface::{Page, Surface};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub browser: Arc<DatasetBrowser>,
    pub highlighter: EntityHighlighter,
}

impl AppState {
    pub fn new(browser: DatasetBrowser) -> Self {
        Self {
            browser: Arc::new(browser),
            highlighter: EntityHighlighter::new(),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub data_dir: String,
}

#[derive(Debug, Serialize)]
pub struct TargetInfo {
    pub file: String,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    pub file: String,
    pub ids: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    pub text: String,
    pub ents: Vec<EntitySpan>,
    pub title: Option<String>,
    pub colors: Option<ColorSpec>,
    /// Labels to highlight; all labels when absent.
    pub labels: Option<Vec<String>>,
}

/// HTTP status for a gallery error.
pub fn status_for(error: &GalleryError) -> StatusCode {
    match error {
        GalleryError::UnknownTarget(_) | GalleryError::ExampleNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        GalleryError::UnsortedEntities { .. }
        | GalleryError::InvalidSpan { .. }
        | GalleryError::PaletteExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body for API routes.
pub struct ApiError(pub GalleryError);

impl From<GalleryError> for ApiError {
    fn from(error: GalleryError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn error_page(title: &str, error: &GalleryError) -> Response {
    tracing::error!("Render failed: {}", error);
    let mut page = Page::new(title);
    page.sidebar_title(title);
    page.header("Failed to render");
    page.markdown(&error.to_string());
    (status_for(error), Html(page.to_html())).into_response()
}

fn join_failure(e: tokio::task::JoinError) -> Response {
    tracing::error!("Render task failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "render task failed").into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/targets", get(list_targets))
        .route("/api/examples", get(list_examples))
        .route("/api/highlight", post(highlight))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Render the gallery page for the query's selections
async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let browser = state.browser.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let mut page = Page::from_query(browser.title(), pairs);
        browser
            .visualize(&mut page)
            .map(|_| page.to_html())
            .map_err(|e| (browser.title().to_string(), e))
    })
    .await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err((title, e))) => error_page(&title, &e),
        Err(e) => join_failure(e),
    }
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        data_dir: state.browser.store().root().display().to_string(),
    })
}

/// GET /api/targets - The eight selectable files
async fn list_targets() -> Json<Vec<TargetInfo>> {
    Json(
        Target::all()
            .into_iter()
            .map(|t| TargetInfo {
                file: t.file_name(),
                kind: t.kind(),
            })
            .collect(),
    )
}

/// GET /api/examples?file=train.json&types=... - Example ids after type filtering
async fn list_examples(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let file = pairs
        .iter()
        .find(|(k, _)| k == KEY_FILE)
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    let types: Vec<String> = pairs
        .into_iter()
        .filter(|(k, _)| k == KEY_TYPES)
        .map(|(_, v)| v)
        .collect();

    let split = match file.parse::<Target>() {
        Ok(Target::DialogueSplit(split)) => split,
        Ok(Target::DatabaseTable(_)) | Err(_) => {
            return ApiError(GalleryError::UnknownTarget(file)).into_response()
        }
    };

    let browser = state.browser.clone();
    let listed = tokio::task::spawn_blocking(move || {
        let filter = (!types.is_empty()).then_some(types);
        browser.example_ids(split, filter.as_deref())
    })
    .await;

    match listed {
        Ok(Ok(ids)) => Json(ExamplesResponse {
            total: ids.len(),
            file,
            ids,
        })
        .into_response(),
        Ok(Err(e)) => ApiError(e).into_response(),
        Err(e) => join_failure(e),
    }
}

/// POST /api/highlight - Render an entity document as a highlight page
async fn highlight(
    State(state): State<AppState>,
    Json(request): Json<HighlightRequest>,
) -> Result<Html<String>, ApiError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(labels) = request.labels {
        // Empty value keeps the key present for an empty selection.
        pairs.push(("labels".to_string(), String::new()));
        pairs.extend(labels.into_iter().map(|l| ("labels".to_string(), l)));
    }

    let title = "Entity Highlighter";
    let mut page = Page::from_query(title, pairs);
    page.sidebar_title(title);
    let doc = EntityDoc {
        text: request.text,
        ents: request.ents,
    };
    state.highlighter.highlight(
        &mut page,
        doc,
        request.title.as_deref(),
        request.colors.as_ref(),
    )?;

    Ok(Html(page.to_html()))
}
