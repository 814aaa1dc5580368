//! HTTP route handlers and router configuration

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use randverse_core::CategoryEntry;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{Result, WebError};
use crate::html::{invalid_category_page, VersePage};
use crate::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(random_verse))
        .route("/categories", get(categories))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomQuery {
    #[serde(default)]
    pub narrow: Option<String>,
}

/// GET /?narrow=<category>
pub async fn random_verse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RandomQuery>,
) -> Result<Html<String>> {
    let narrow = query.narrow.unwrap_or_default();
    let page = tokio::task::spawn_blocking(move || render_random(&state, &narrow)).await??;
    Ok(Html(page))
}

fn render_random(state: &AppState, narrow: &str) -> Result<String> {
    let picker = &state.picker;
    let messages = picker.messages();

    if !narrow.is_empty() && !picker.is_valid_category(narrow) {
        return Err(WebError::InvalidCategory {
            key: narrow.to_string(),
            page: invalid_category_page(messages, narrow, &picker.list_categories()),
        });
    }

    // per-request generator; the shared lock is held for a single draw
    let mut rng = StdRng::seed_from_u64(state.rng.lock().gen());
    let mut pick = picker
        .select_verse(Some(narrow), &mut rng)
        .map_err(|err| {
            warn!(%err, narrow, "verse selection failed");
            WebError::from_verse(&err, messages)
        })?;

    let mut page = VersePage::new(messages, pick.book_name(), pick.offset, pick.total_lines());
    for line in pick.verses.by_ref() {
        match line {
            Ok(line) => page.push(&line),
            Err(err) if page.is_empty() => {
                warn!(%err, "failed to read selected verse");
                return Err(WebError::from_verse(&err, messages));
            }
            Err(err) => {
                warn!(%err, rendered = page.len(), "verse stream ended with an error");
                break;
            }
        }
    }
    Ok(page.finish())
}

/// GET /categories
pub async fn categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryEntry>> {
    Json(state.picker.list_categories())
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    tracing::debug!("health check requested");
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
