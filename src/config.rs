use anyhow::{Context, Result};

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    /// Absolute origin used for sitemap URLs
    pub site_url: String,

    // Content backend (documents, slugs, categories)
    pub cms_api_url: String,
    pub cms_dataset: String,
    pub cms_api_version: String,
    pub cms_token: Option<String>,

    // Relational backend (ideas, bugs, roadmap)
    pub db_url: String,
    pub db_anon_key: String,
    pub db_service_key: Option<String>,

    // Admin
    pub admin_api_key: Option<String>,

    // Messages
    pub messages_dir: Option<String>,

    // Listings
    pub default_page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            port,
            site_url: std::env::var("SITE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{}", port)),

            // Content backend
            cms_api_url: std::env::var("CMS_API_URL").context("CMS_API_URL not set")?,
            cms_dataset: std::env::var("CMS_DATASET")
                .unwrap_or_else(|_| "production".to_string()),
            cms_api_version: std::env::var("CMS_API_VERSION")
                .unwrap_or_else(|_| "2024-01-01".to_string()),
            cms_token: std::env::var("CMS_TOKEN").ok().filter(|v| !v.is_empty()),

            // Relational backend
            db_url: std::env::var("DB_URL").context("DB_URL not set")?,
            db_anon_key: std::env::var("DB_ANON_KEY").context("DB_ANON_KEY not set")?,
            db_service_key: std::env::var("DB_SERVICE_KEY").ok().filter(|v| !v.is_empty()),

            admin_api_key: std::env::var("ADMIN_API_KEY").ok().filter(|v| !v.is_empty()),
            messages_dir: std::env::var("MESSAGES_DIR").ok().filter(|v| !v.is_empty()),

            default_page_size: std::env::var("DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(clamp_page_size)
                .unwrap_or(10),
        })
    }

    /// Resolve a requested page size against the configured default.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .map(clamp_page_size)
            .unwrap_or(self.default_page_size)
    }
}

/// Clamp a page size into `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
pub(crate) fn test_config(cms_api_url: &str, db_url: &str) -> Config {
    Config {
        port: 3000,
        site_url: "https://example.com".to_string(),
        cms_api_url: cms_api_url.to_string(),
        cms_dataset: "production".to_string(),
        cms_api_version: "2024-01-01".to_string(),
        cms_token: Some("test-cms-token".to_string()),
        db_url: db_url.to_string(),
        db_anon_key: "test-anon-key".to_string(),
        db_service_key: None,
        admin_api_key: None,
        messages_dir: None,
        default_page_size: 10,
    }
}
