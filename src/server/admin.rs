//! Admin API under `/admin`, guarded by the `X-Admin-Key` header.
//!
//! Admin paths bypass locale rewriting, so the display locale comes from
//! `?locale=`; an unknown value falls back to the default locale.

use super::{json_body, ApiError, AppState, Success};
use crate::content::{NewCategory, NewRoadmapItem, PostSummary, RoadmapItem};
use crate::i18n::Locale;
use crate::security::{admin_key_matches, ADMIN_KEY_HEADER};
use crate::taxonomy::build_hierarchy;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", delete(delete_category))
        .route("/posts", get(list_posts))
        .route("/posts/:id", delete(delete_post))
        .route("/roadmap", get(list_roadmap).post(create_roadmap_item))
        .route("/roadmap/:id", delete(delete_roadmap_item))
        .route("/ideas/:id", delete(delete_idea))
        .route_layer(middleware::from_fn_with_state(state, require_admin_key))
}

async fn require_admin_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !admin_key_matches(state.config.admin_api_key.as_deref(), presented) {
        warn!("Rejected admin request to {}", req.uri().path());
        return ApiError::Unauthorized.into_response();
    }

    next.run(req).await
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

impl LocaleQuery {
    fn locale(&self) -> Locale {
        self.locale
            .as_deref()
            .and_then(|code| Locale::from_code(code).ok())
            .unwrap_or_default()
    }
}

// ==================== Categories ====================

/// Categories in hierarchy order, each row tagged with its depth.
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<Value>, ApiError> {
    let locale = query.locale();
    let categories = state.cms.list_categories().await?;
    let hierarchy = build_hierarchy(&categories, locale);

    Ok(Json(json!({
        "locale": locale,
        "rows": hierarchy.rows(),
        "orphans": hierarchy.orphans.len(),
    })))
}

async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<Success<Value>, ApiError> {
    let input = json_body(payload)?;
    let id = state.cms.create_category(&input).await?;
    Ok(Success(StatusCode::CREATED, json!({ "id": id })))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<Value>, ApiError> {
    state.cms.delete_category(&id).await?;
    Ok(Success(StatusCode::OK, json!({ "id": id })))
}

// ==================== Posts ====================

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostSummary>>, ApiError> {
    Ok(Json(state.cms.list_all_posts().await?))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<Value>, ApiError> {
    state.cms.delete_post(&id).await?;
    Ok(Success(StatusCode::OK, json!({ "id": id })))
}

// ==================== Roadmap / Ideas ====================

async fn list_roadmap(State(state): State<AppState>) -> Result<Json<Vec<RoadmapItem>>, ApiError> {
    Ok(Json(state.db.list_roadmap_items().await?))
}

async fn create_roadmap_item(
    State(state): State<AppState>,
    payload: Result<Json<NewRoadmapItem>, JsonRejection>,
) -> Result<Success<RoadmapItem>, ApiError> {
    let input = json_body(payload)?;
    let item = state.db.create_roadmap_item(&input).await?;
    Ok(Success(StatusCode::CREATED, item))
}

async fn delete_roadmap_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Success<Value>, ApiError> {
    state.db.delete_roadmap_item(id).await?;
    Ok(Success(StatusCode::OK, json!({ "id": id })))
}

async fn delete_idea(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Success<Value>, ApiError> {
    state.db.delete_idea(id).await?;
    Ok(Success(StatusCode::OK, json!({ "id": id })))
}
