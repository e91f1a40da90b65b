//! Integration tests for the site portal
//!
//! These tests drive the public library API end to end: locale resolution
//! feeding message loading, the full router against mocked backends, and
//! optimistic category deletes against a failing content backend.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use site_portal::config::Config;
use site_portal::content::CmsClient;
use site_portal::i18n::{Locale, LocaleRegistry, MessageLoader, MessageSource};
use site_portal::optimistic::{apply_remove, OptimisticList};
use site_portal::routing::{localized_path, resolve_path, PathResolution};
use site_portal::server::{build_app, AppState};
use site_portal::taxonomy::{order_categories, Category, LocalizedText, ParentRef};

// ==================== Test Helpers ====================

const CMS_QUERY_PATH: &str = "/v2024-01-01/data/query/production";
const CMS_MUTATE_PATH: &str = "/v2024-01-01/data/mutate/production";

/// Create a test config pointing at mocked backends
fn create_test_config(cms_url: &str, db_url: &str) -> Config {
    Config {
        port: 0,
        site_url: "https://portal.example.com".to_string(),
        cms_api_url: cms_url.to_string(),
        cms_dataset: "production".to_string(),
        cms_api_version: "2024-01-01".to_string(),
        cms_token: Some("test-cms-token".to_string()),
        db_url: db_url.to_string(),
        db_anon_key: "test-anon-key".to_string(),
        db_service_key: None,
        admin_api_key: Some("test-admin-key".to_string()),
        messages_dir: None,
        default_page_size: 10,
    }
}

fn category(id: &str, title: &str, parent: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        title: LocalizedText::from(title),
        slug: title.to_lowercase(),
        color: None,
        parent: parent.map(|p| ParentRef::Title(p.to_string())),
        post_count: 0,
    }
}

fn titles(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .map(|c| c.display_title(Locale::ENGLISH).to_string())
        .collect()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body should be JSON")
}

// ==================== Locale Resolution Tests ====================

#[test]
fn test_every_locale_round_trips_through_link_generation() {
    let registry = LocaleRegistry::get();
    for config in registry.list_enabled() {
        let locale = Locale::from_code(config.code).unwrap();
        let link = localized_path(locale, "/roadmap");

        match resolve_path(registry, &link) {
            PathResolution::Localized(resolved) => {
                assert_eq!(resolved.locale, locale);
                assert_eq!(resolved.clean_path, "/roadmap");
            }
            PathResolution::Bypass => panic!("{} should not bypass", link),
        }
    }
}

#[tokio::test]
async fn test_resolved_locale_selects_bundle() {
    let registry = LocaleRegistry::get();
    let loader = MessageLoader::embedded();

    let PathResolution::Localized(resolved) = resolve_path(registry, "/ja/faq") else {
        panic!("/ja/faq should resolve");
    };
    let japanese = loader.load(resolved.locale.code()).await;
    let english = loader.load(Locale::default_locale().code()).await;

    assert!(!japanese.is_empty());
    assert_ne!(japanese.text("nav.home"), english.text("nav.home"));
}

#[tokio::test]
async fn test_missing_bundle_file_degrades_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("en.json"), r#"{"nav": {"home": "Home"}}"#).unwrap();
    std::fs::write(temp_dir.path().join("ko.json"), "{ not json").unwrap();

    let loader = MessageLoader::new(MessageSource::Directory(temp_dir.path().to_path_buf()));

    assert_eq!(loader.load("en").await.text("nav.home"), "Home");
    assert!(loader.load("ko").await.is_empty());
    assert!(loader.load("ja").await.is_empty());
    assert_eq!(loader.load("ja").await.text("nav.home"), "nav.home");
}

// ==================== Taxonomy Tests ====================

#[test]
fn test_hierarchy_order_with_orphan() {
    let records = vec![
        category("1", "AI", None),
        category("2", "LLM", Some("AI")),
        category("3", "Zoo", None),
        category("4", "Orphan", Some("Ghost")),
    ];

    let ordered = order_categories(&records, Locale::ENGLISH);
    assert_eq!(titles(&ordered), vec!["AI", "LLM", "Zoo", "Orphan"]);
}

#[test]
fn test_hierarchy_empty_input() {
    assert!(order_categories(&[], Locale::ENGLISH).is_empty());
}

// ==================== Router Tests ====================

#[tokio::test]
async fn test_localized_blog_page_end_to_end() {
    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CMS_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"_id": "p1", "title": "Hola", "slug": {"current": "hola"}, "language": "es"}]
        })))
        .mount(&cms)
        .await;

    let app = build_app(AppState::new(create_test_config(&cms.uri(), "http://127.0.0.1:9")));
    let response = app
        .oneshot(Request::get("/es/blog").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["locale"], "es");
    assert_eq!(body["data"][0]["slug"], "hola");
    assert_eq!(body["nav"]["home"], "Inicio");
}

#[tokio::test]
async fn test_admin_delete_requires_key() {
    let app = build_app(AppState::new(create_test_config(
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    )));
    let response = app
        .oneshot(
            Request::delete("/admin/categories/c1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);
}

// ==================== Optimistic Delete Tests ====================

#[tokio::test]
async fn test_failed_category_delete_restores_list() {
    let cms = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CMS_MUTATE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string("category is referenced"))
        .expect(1)
        .mount(&cms)
        .await;

    let config = create_test_config(&cms.uri(), "http://127.0.0.1:9");
    let client = CmsClient::new(&config);

    let records = vec![
        category("1", "AI", None),
        category("2", "LLM", Some("AI")),
        category("3", "Zoo", None),
    ];
    let before = order_categories(&records, Locale::ENGLISH);
    let mut list = OptimisticList::new(before.clone());

    let result = apply_remove(&mut list, "2", client.delete_category("2")).await;

    assert!(result.is_err());
    assert_eq!(list.items(), before.as_slice());
}

#[tokio::test]
async fn test_successful_category_delete_keeps_removal() {
    let cms = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CMS_MUTATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": "t1",
            "results": [{"id": "3", "operation": "delete"}]
        })))
        .mount(&cms)
        .await;

    let config = create_test_config(&cms.uri(), "http://127.0.0.1:9");
    let client = CmsClient::new(&config);

    let records = vec![category("1", "AI", None), category("3", "Zoo", None)];
    let mut list = OptimisticList::new(order_categories(&records, Locale::ENGLISH));

    apply_remove(&mut list, "3", client.delete_category("3"))
        .await
        .unwrap();

    assert_eq!(titles(list.items()), vec!["AI"]);
}
