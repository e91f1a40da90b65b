//! Locale resolution for incoming request paths.
//!
//! Non-default locales live under a `/{locale}` prefix; the default locale
//! is served unprefixed ("prefix only when necessary"). API, admin, asset
//! and file-like paths are never localized.

use crate::i18n::{Locale, LocaleRegistry};
use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;
use std::convert::Infallible;
use tracing::warn;

pub const API_PREFIX: &str = "/api";
pub const ADMIN_PREFIX: &str = "/admin";
pub const ASSET_PREFIX: &str = "/_assets";

const BYPASS_PREFIXES: [&str; 3] = [API_PREFIX, ADMIN_PREFIX, ASSET_PREFIX];

/// Outcome of resolving a localized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub locale: Locale,
    /// Path with the locale segment removed
    pub clean_path: String,
    /// Whether the incoming path carried an explicit locale segment
    pub prefixed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Passed through untouched (API, admin, assets, files)
    Bypass,
    Localized(ResolvedLocale),
}

/// `path` is `prefix` itself or lives below it (segment-aware: `/apiary`
/// is not under `/api`).
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn last_segment_has_dot(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

/// Paths that skip locale resolution entirely.
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES
        .iter()
        .any(|prefix| has_segment_prefix(path, prefix))
        || last_segment_has_dot(path)
}

/// Decide the effective locale and clean path for `path`.
///
/// A first segment naming a supported locale always wins, even if a page
/// with that slug exists. Anything else (including locale-looking segments
/// that are not supported) resolves to the default locale with the path
/// left as-is.
pub fn resolve_path(registry: &LocaleRegistry, path: &str) -> PathResolution {
    if is_bypassed(path) {
        return PathResolution::Bypass;
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };

    if let Ok(locale) = Locale::from_registry(registry, first) {
        let clean_path = format!("/{}", rest);
        // A locale prefix does not unlock the API or admin surface.
        if !is_bypassed(&clean_path) {
            return PathResolution::Localized(ResolvedLocale {
                locale,
                clean_path,
                prefixed: true,
            });
        }
    }

    let clean_path = if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    };

    PathResolution::Localized(ResolvedLocale {
        locale: Locale::default_in(registry),
        clean_path,
        prefixed: false,
    })
}

/// Public URL path of `path` in `locale`; the default locale stays unprefixed.
pub fn localized_path(locale: Locale, path: &str) -> String {
    if locale.is_default() {
        return path.to_string();
    }
    if path == "/" || path.is_empty() {
        format!("/{}", locale.code())
    } else {
        format!("/{}{}", locale.code(), path)
    }
}

/// `(locale, url path)` for every enabled locale, for language switchers
/// and `hreflang` links.
pub fn alternate_paths(path: &str) -> Vec<(Locale, String)> {
    LocaleRegistry::get()
        .list_enabled()
        .into_iter()
        .filter_map(|config| Locale::from_code(config.code).ok())
        .map(|locale| (locale, localized_path(locale, path)))
        .collect()
}

fn rewrite_uri(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}

/// Middleware: strip the locale prefix and record the resolved locale in
/// request extensions.
///
/// Must run before routing, so apply it to a router whose only route is a
/// fallback to the real routes.
pub async fn locale_middleware(mut req: Request, next: Next) -> Response {
    let resolution = resolve_path(LocaleRegistry::get(), req.uri().path());

    if let PathResolution::Localized(resolved) = resolution {
        if resolved.prefixed {
            match rewrite_uri(req.uri(), &resolved.clean_path) {
                Some(uri) => *req.uri_mut() = uri,
                None => warn!("Could not rewrite {} to {}", req.uri(), resolved.clean_path),
            }
        }
        req.extensions_mut().insert(resolved);
    }

    next.run(req).await
}

/// Locale of the current request, defaulting when the middleware did not
/// resolve one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale {
    pub locale: Locale,
    /// Unprefixed path of the current page
    pub path: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<ResolvedLocale>() {
            Some(resolved) => RequestLocale {
                locale: resolved.locale,
                path: resolved.clean_path.clone(),
            },
            None => RequestLocale {
                locale: Locale::default_locale(),
                path: parts.uri.path().to_string(),
            },
        })
    }
}
