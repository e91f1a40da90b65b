//! HTTP surface: localized pages, the public API and the admin API.
//!
//! Locale resolution runs as the outermost middleware so the URI is already
//! unprefixed when the inner router matches routes.

mod admin;
mod api;
mod pages;

use crate::config::Config;
use crate::content::{CmsClient, ContentError, DbClient};
use crate::i18n::{MessageLoader, MessageSource};
use crate::routing::locale_middleware;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cms: CmsClient,
    pub db: DbClient,
    pub messages: MessageLoader,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let messages = match &config.messages_dir {
            Some(dir) => {
                info!("Loading messages from {}", dir);
                MessageLoader::new(MessageSource::Directory(PathBuf::from(dir)))
            }
            None => MessageLoader::embedded(),
        };
        let http = reqwest::Client::new();

        Self {
            cms: CmsClient::with_client(http.clone(), &config),
            db: DbClient::with_client(http, &config),
            messages,
            config: Arc::new(config),
        }
    }
}

/// Build the full application router.
pub fn build_app(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(pages::home))
        .route("/blog", get(pages::blog))
        .route("/blog/:slug", get(pages::blog_post))
        .route("/roadmap", get(pages::roadmap))
        .route("/ideas", get(pages::ideas))
        .route("/bugs", get(pages::bugs))
        .route("/faq", get(pages::faq))
        .route("/sitemap.xml", get(pages::sitemap))
        .nest("/api", api::routes())
        .nest("/admin", admin::routes(state.clone()))
        .with_state(state);

    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn(locale_middleware))
        .layer(TraceLayer::new_for_http())
}

// ==================== Responses ====================

/// Successful mutation: `{ "success": true, "data": ... }`.
pub struct Success<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "success": true, "data": self.1 }))).into_response()
    }
}

/// Failure at the HTTP boundary, rendered as `{ "success": false, "error": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Content(e) => match e {
                ContentError::Validation(_) => StatusCode::BAD_REQUEST,
                ContentError::NotFound(_) => StatusCode::NOT_FOUND,
                ContentError::Unauthorized(_) => StatusCode::SERVICE_UNAVAILABLE,
                ContentError::Request(_)
                | ContentError::Backend { .. }
                | ContentError::Decode(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

/// Turn a body that failed to parse into the failure envelope.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
