//! Public JSON API under `/api`.

use super::{json_body, ApiError, AppState, Success};
use crate::content::{Bug, Idea, ListFilter, NewBug, NewIdea, Page, RoadmapItem};
use crate::i18n::{LoadMetrics, LocaleRegistry};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ideas", get(list_ideas).post(create_idea))
        .route("/bugs", get(list_bugs).post(create_bug))
        .route("/roadmap", get(list_roadmap))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    fn split(self, state: &AppState) -> (ListFilter, u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = state.config.page_size(self.page_size);
        let filter = ListFilter {
            status: self.status,
            search: self.search,
        };
        (filter, page, page_size)
    }
}

async fn health() -> Json<Value> {
    let locales: Vec<&str> = LocaleRegistry::get()
        .list_enabled()
        .into_iter()
        .map(|config| config.code)
        .collect();

    Json(json!({
        "status": "ok",
        "locales": locales,
        "messages": LoadMetrics::global().report(),
    }))
}

async fn list_ideas(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Idea>>, ApiError> {
    let (filter, page, page_size) = query.split(&state);
    Ok(Json(state.db.list_ideas(&filter, page, page_size).await?))
}

async fn create_idea(
    State(state): State<AppState>,
    payload: Result<Json<NewIdea>, JsonRejection>,
) -> Result<Success<Idea>, ApiError> {
    let input = json_body(payload)?;
    let idea = state.db.create_idea(&input).await?;
    Ok(Success(StatusCode::CREATED, idea))
}

async fn list_bugs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Bug>>, ApiError> {
    let (filter, page, page_size) = query.split(&state);
    Ok(Json(state.db.list_bugs(&filter, page, page_size).await?))
}

async fn create_bug(
    State(state): State<AppState>,
    payload: Result<Json<NewBug>, JsonRejection>,
) -> Result<Success<Bug>, ApiError> {
    let input = json_body(payload)?;
    let bug = state.db.create_bug(&input).await?;
    Ok(Success(StatusCode::CREATED, bug))
}

async fn list_roadmap(State(state): State<AppState>) -> Result<Json<Vec<RoadmapItem>>, ApiError> {
    Ok(Json(state.db.list_roadmap_items().await?))
}
