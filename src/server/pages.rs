//! Localized page view models.
//!
//! Every page renders: a failed listing fetch becomes an empty list with
//! `empty: true`, and a failed bundle load becomes an empty message section.

use super::AppState;
use crate::content::{Bug, Idea, ListFilter, Page, Post, PostSummary, RoadmapItem, RoadmapStatus};
use crate::i18n::{Locale, LocaleRegistry, MessageBundle};
use crate::routing::{alternate_paths, localized_path, RequestLocale};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::error;

const HOME_POST_COUNT: usize = 3;

/// Top-level pages listed in the sitemap for every locale.
const STATIC_PAGES: [&str; 6] = ["/", "/blog", "/roadmap", "/ideas", "/bugs", "/faq"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternate {
    pub locale: Locale,
    pub native_name: &'static str,
    pub href: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    pub locale: Locale,
    pub path: String,
    pub alternates: Vec<Alternate>,
    pub nav: MessageBundle,
    pub meta: MessageBundle,
    pub messages: MessageBundle,
    /// True when the page's content could not be fetched
    pub empty: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct RoadmapColumn {
    pub status: RoadmapStatus,
    pub title: String,
    pub items: Vec<RoadmapItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl PageQuery {
    fn filter(&self) -> ListFilter {
        ListFilter {
            status: self.status.clone(),
            search: self.search.clone(),
        }
    }
}

fn view<T>(locale: &RequestLocale, bundle: &MessageBundle, section: &str, empty: bool, data: T) -> PageView<T> {
    let alternates = alternate_paths(&locale.path)
        .into_iter()
        .map(|(alt, href)| Alternate {
            locale: alt,
            native_name: alt.native_name(),
            href,
        })
        .collect();

    PageView {
        locale: locale.locale,
        path: localized_path(locale.locale, &locale.path),
        alternates,
        nav: bundle.section("nav"),
        meta: bundle.section("meta"),
        messages: bundle.section(section),
        empty,
        data,
    }
}

/// Absorb a listing failure: log it and render the fallback.
fn or_empty<T, E: Display>(result: Result<T, E>, fallback: T, what: &str, locale: Locale) -> (T, bool) {
    match result {
        Ok(value) => (value, false),
        Err(e) => {
            error!("Failed to fetch {} for '{}': {}", what, locale, e);
            (fallback, true)
        }
    }
}

pub async fn home(State(state): State<AppState>, locale: RequestLocale) -> Json<PageView<Vec<PostSummary>>> {
    let (bundle, posts) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.cms.list_posts(locale.locale)
    );
    let (mut posts, empty) = or_empty(posts, Vec::new(), "posts", locale.locale);
    posts.truncate(HOME_POST_COUNT);

    Json(view(&locale, &bundle, "home", empty, posts))
}

pub async fn blog(State(state): State<AppState>, locale: RequestLocale) -> Json<PageView<Vec<PostSummary>>> {
    let (bundle, posts) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.cms.list_posts(locale.locale)
    );
    let (posts, empty) = or_empty(posts, Vec::new(), "posts", locale.locale);

    Json(view(&locale, &bundle, "blog", empty, posts))
}

/// A post the backend reports as missing is a 404; a failed fetch still
/// renders the page with no post.
pub async fn blog_post(
    State(state): State<AppState>,
    locale: RequestLocale,
    Path(slug): Path<String>,
) -> Response {
    let (bundle, post) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.cms.get_post_by_slug(&slug, locale.locale)
    );

    let (post, empty): (Option<Post>, bool) = match post {
        Ok(Some(post)) => (Some(post), false),
        Ok(None) => {
            let page = view(&locale, &bundle, "blog", true, None::<Post>);
            return (StatusCode::NOT_FOUND, Json(page)).into_response();
        }
        Err(e) => {
            error!("Failed to fetch post '{}' for '{}': {}", slug, locale.locale, e);
            (None, true)
        }
    };

    Json(view(&locale, &bundle, "blog", empty, post)).into_response()
}

pub async fn roadmap(State(state): State<AppState>, locale: RequestLocale) -> Json<PageView<Vec<RoadmapColumn>>> {
    let (bundle, items) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.db.list_roadmap_items()
    );
    let (items, empty) = or_empty(items, Vec::new(), "roadmap items", locale.locale);

    let columns = RoadmapStatus::ALL
        .iter()
        .map(|status| RoadmapColumn {
            status: *status,
            title: bundle.text(status.message_key()),
            items: items.iter().filter(|i| i.status == *status).cloned().collect(),
        })
        .collect();

    Json(view(&locale, &bundle, "roadmap", empty, columns))
}

pub async fn ideas(
    State(state): State<AppState>,
    locale: RequestLocale,
    Query(query): Query<PageQuery>,
) -> Json<PageView<Page<Idea>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.page_size(None);
    let filter = query.filter();

    let (bundle, ideas) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.db.list_ideas(&filter, page, page_size)
    );
    let (ideas, empty) = or_empty(ideas, Page::empty(page, page_size), "ideas", locale.locale);

    Json(view(&locale, &bundle, "ideas", empty, ideas))
}

pub async fn bugs(
    State(state): State<AppState>,
    locale: RequestLocale,
    Query(query): Query<PageQuery>,
) -> Json<PageView<Page<Bug>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.page_size(None);
    let filter = query.filter();

    let (bundle, bugs) = futures::join!(
        state.messages.load(locale.locale.code()),
        state.db.list_bugs(&filter, page, page_size)
    );
    let (bugs, empty) = or_empty(bugs, Page::empty(page, page_size), "bugs", locale.locale);

    Json(view(&locale, &bundle, "bugs", empty, bugs))
}

pub async fn faq(State(state): State<AppState>, locale: RequestLocale) -> Json<PageView<()>> {
    let bundle = state.messages.load(locale.locale.code()).await;
    Json(view(&locale, &bundle, "faq", false, ()))
}

// ==================== Sitemap ====================

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sitemap body: every static page and post slug in every enabled locale.
pub fn render_sitemap(site_url: &str, slugs: &BTreeSet<String>) -> String {
    let locales: Vec<Locale> = LocaleRegistry::get()
        .list_enabled()
        .into_iter()
        .filter_map(|config| Locale::from_code(config.code).ok())
        .collect();

    let paths = STATIC_PAGES
        .iter()
        .map(|p| p.to_string())
        .chain(slugs.iter().map(|slug| format!("/blog/{}", slug)));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in paths {
        for locale in &locales {
            xml.push_str("  <url><loc>");
            xml.push_str(&xml_escape(&format!("{}{}", site_url, localized_path(*locale, &path))));
            xml.push_str("</loc></url>\n");
        }
    }
    xml.push_str("</urlset>\n");
    xml
}

pub async fn sitemap(State(state): State<AppState>) -> Response {
    let slugs = match state.cms.list_all_slugs().await {
        Ok(slugs) => slugs.into_iter().map(|s| s.slug).filter(|s| !s.is_empty()).collect(),
        Err(e) => {
            error!("Failed to fetch post slugs for sitemap: {}", e);
            BTreeSet::new()
        }
    };

    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap(&state.config.site_url, &slugs),
    )
        .into_response()
}
