//! Message bundles and the per-request message loader.
//!
//! A bundle is the translated-string tree for one locale. Loading never
//! fails the render path: any error degrades to an empty bundle, so pages
//! show their message keys instead of crashing.

use crate::i18n::LoadMetrics;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("no message bundle registered for locale '{0}'")]
    UnknownLocale(String),

    #[error("failed to read messages for '{locale}': {source}")]
    Io {
        locale: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse messages for '{locale}': {source}")]
    Parse {
        locale: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("messages for '{0}' are not a JSON object")]
    NotAnObject(String),
}

/// Translated strings for one locale, addressed by dotted keys
/// (e.g. `"blog.title"`). Leaves are strings or arrays of structures such
/// as FAQ sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MessageBundle {
    root: Map<String, Value>,
}

impl MessageBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a parsed JSON document; the top level must be an object.
    pub fn from_value(locale: &str, value: Value) -> Result<Self, MessageError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(MessageError::NotAnObject(locale.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a value by dotted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Translated string for `key`, or the key itself when missing.
    pub fn text(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Sub-bundle rooted at `key`; empty when the key is missing or a leaf.
    pub fn section(&self, key: &str) -> MessageBundle {
        match self.get(key) {
            Some(Value::Object(map)) => MessageBundle { root: map.clone() },
            _ => MessageBundle::empty(),
        }
    }

    /// All leaf keys in dotted form. Arrays count as leaves.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", &mut keys);
        keys.sort();
        keys
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (name, value) in map {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            Value::Object(child) => collect_keys(child, &key, out),
            _ => out.push(key),
        }
    }
}

/// Where bundles come from.
#[derive(Debug, Clone)]
pub enum MessageSource {
    /// Bundles compiled into the binary, keyed by exact locale string
    Embedded,
    /// One `<locale>.json` file per locale in this directory
    Directory(PathBuf),
}

/// Bundles compiled into the binary.
fn embedded_bundle(locale: &str) -> Option<&'static str> {
    match locale {
        "en" => Some(include_str!("../../messages/en.json")),
        "zh" => Some(include_str!("../../messages/zh.json")),
        "zh-Hant" => Some(include_str!("../../messages/zh-Hant.json")),
        "ko" => Some(include_str!("../../messages/ko.json")),
        "es" => Some(include_str!("../../messages/es.json")),
        "ja" => Some(include_str!("../../messages/ja.json")),
        _ => None,
    }
}

/// A locale key is only ever used as a file stem, never as a path.
fn is_safe_key(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone)]
pub struct MessageLoader {
    source: MessageSource,
}

impl MessageLoader {
    pub fn new(source: MessageSource) -> Self {
        Self { source }
    }

    pub fn embedded() -> Self {
        Self::new(MessageSource::Embedded)
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    /// Load the bundle for `locale`.
    ///
    /// Makes exactly one attempt. On failure the error is logged and an
    /// empty bundle is returned; this never propagates an error.
    pub async fn load(&self, locale: &str) -> MessageBundle {
        let metrics = LoadMetrics::global();
        metrics.record_load();

        match self.try_load(locale).await {
            Ok(bundle) => {
                debug!("Loaded {} message keys for '{}'", bundle.root.len(), locale);
                bundle
            }
            Err(e) => {
                metrics.record_failure();
                warn!("Rendering '{}' with an empty message bundle: {}", locale, e);
                MessageBundle::empty()
            }
        }
    }

    /// Load the bundle for `locale`, surfacing the failure reason.
    pub async fn try_load(&self, locale: &str) -> Result<MessageBundle, MessageError> {
        let raw: Cow<'static, str> = match &self.source {
            MessageSource::Embedded => embedded_bundle(locale)
                .map(Cow::Borrowed)
                .ok_or_else(|| MessageError::UnknownLocale(locale.to_string()))?,
            MessageSource::Directory(dir) => {
                if !is_safe_key(locale) {
                    return Err(MessageError::UnknownLocale(locale.to_string()));
                }
                let path = dir.join(format!("{}.json", locale));
                let contents =
                    tokio::fs::read_to_string(&path)
                        .await
                        .map_err(|source| MessageError::Io {
                            locale: locale.to_string(),
                            source,
                        })?;
                Cow::Owned(contents)
            }
        };

        let value: Value = serde_json::from_str(&raw).map_err(|source| MessageError::Parse {
            locale: locale.to_string(),
            source,
        })?;

        MessageBundle::from_value(locale, value)
    }
}

impl Default for MessageLoader {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocaleRegistry;
    use serde_json::json;
    use tempfile::TempDir;

    // ==================== MessageBundle Tests ====================

    fn sample_bundle() -> MessageBundle {
        MessageBundle::from_value(
            "en",
            json!({
                "nav": { "blog": "Blog", "roadmap": "Roadmap" },
                "faq": { "sections": [{ "question": "Q", "answer": "A" }] },
                "title": "Home"
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_get_dotted_key() {
        let bundle = sample_bundle();
        assert_eq!(bundle.get("nav.blog"), Some(&json!("Blog")));
        assert_eq!(bundle.get("title"), Some(&json!("Home")));
        assert!(bundle.get("nav.missing").is_none());
        assert!(bundle.get("title.deeper").is_none());
    }

    #[test]
    fn test_text_falls_back_to_key() {
        let bundle = sample_bundle();
        assert_eq!(bundle.text("nav.roadmap"), "Roadmap");
        assert_eq!(bundle.text("nav.pricing"), "nav.pricing");
        assert_eq!(MessageBundle::empty().text("nav.blog"), "nav.blog");
    }

    #[test]
    fn test_section_returns_subtree() {
        let bundle = sample_bundle();
        let nav = bundle.section("nav");
        assert_eq!(nav.text("blog"), "Blog");
        assert!(bundle.section("title").is_empty());
        assert!(bundle.section("missing").is_empty());
    }

    #[test]
    fn test_keys_treat_arrays_as_leaves() {
        let keys = sample_bundle().keys();
        assert_eq!(keys, vec!["faq.sections", "nav.blog", "nav.roadmap", "title"]);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = MessageBundle::from_value("en", json!(["not", "an", "object"]));
        assert!(matches!(result, Err(MessageError::NotAnObject(_))));
    }

    // ==================== Embedded Loader Tests ====================

    #[tokio::test]
    async fn test_embedded_bundle_for_every_supported_locale() {
        let loader = MessageLoader::embedded();
        for config in LocaleRegistry::get().list_enabled() {
            let bundle = loader
                .try_load(config.code)
                .await
                .unwrap_or_else(|e| panic!("bundle for {} should load: {}", config.code, e));
            assert!(!bundle.is_empty(), "bundle for {} is empty", config.code);
            assert!(bundle.get("nav.blog").is_some());
        }
    }

    #[tokio::test]
    async fn test_embedded_lookup_is_case_sensitive() {
        let loader = MessageLoader::embedded();
        let result = loader.try_load("zh-hant").await;
        assert!(matches!(result, Err(MessageError::UnknownLocale(_))));
    }

    #[tokio::test]
    async fn test_load_unknown_locale_returns_empty_bundle() {
        let bundle = MessageLoader::embedded().load("fr").await;

        assert!(bundle.is_empty());
        assert!(LoadMetrics::global().failures() >= 1);
    }

    // ==================== Directory Loader Tests ====================

    #[tokio::test]
    async fn test_directory_loader_reads_locale_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ko.json"), r#"{"nav":{"blog":"블로그"}}"#).unwrap();

        let loader = MessageLoader::new(MessageSource::Directory(dir.path().to_path_buf()));
        let bundle = loader.load("ko").await;
        assert_eq!(bundle.text("nav.blog"), "블로그");
    }

    #[tokio::test]
    async fn test_directory_loader_missing_file_degrades() {
        let dir = TempDir::new().unwrap();
        let loader = MessageLoader::new(MessageSource::Directory(dir.path().to_path_buf()));

        assert!(matches!(
            loader.try_load("ja").await,
            Err(MessageError::Io { .. })
        ));
        assert!(loader.load("ja").await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_loader_parse_error_degrades() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("es.json"), "{ not json").unwrap();
        let loader = MessageLoader::new(MessageSource::Directory(dir.path().to_path_buf()));

        assert!(matches!(
            loader.try_load("es").await,
            Err(MessageError::Parse { .. })
        ));
        assert!(loader.load("es").await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_loader_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let loader = MessageLoader::new(MessageSource::Directory(dir.path().to_path_buf()));

        assert!(matches!(
            loader.try_load("../secrets").await,
            Err(MessageError::UnknownLocale(_))
        ));
    }
}
