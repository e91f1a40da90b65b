//! Client for the content backend's query and mutation HTTP API.
//!
//! Queries are sent as `GET .../data/query/{dataset}?query=...` with each
//! parameter passed separately as a JSON-encoded `$name` value, so user
//! input (slugs, locales) is never spliced into query text.

use super::{ContentError, NewCategory, Post, PostSlug, PostSummary, Result};
use crate::config::Config;
use crate::i18n::Locale;
use crate::taxonomy::{Category, LocalizedText, ParentRef};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

const POSTS_QUERY: &str = r#"*[_type == "post" && language == $language && defined(slug.current)] | order(publishedAt desc) {
  _id, title, slug, excerpt, publishedAt, language,
  "coverImage": mainImage.asset->url,
  "categories": categories[]->title
}"#;

const ALL_POSTS_QUERY: &str = r#"*[_type == "post"] | order(publishedAt desc) {
  _id, title, slug, excerpt, publishedAt, language,
  "coverImage": mainImage.asset->url,
  "categories": categories[]->title
}"#;

const POST_BY_SLUG_QUERY: &str = r#"*[_type == "post" && slug.current == $slug && language == $language][0] {
  _id, title, slug, excerpt, publishedAt, language, body,
  "coverImage": mainImage.asset->url,
  "categories": categories[]->title,
  "author": author->name
}"#;

const ALL_SLUGS_QUERY: &str =
    r#"*[_type == "post" && defined(slug.current)] { "slug": slug.current, language }"#;

const CATEGORIES_QUERY: &str = r#"*[_type == "category"] | order(title asc) {
  _id, title, slug, color,
  "parent": parent->title,
  "parentId": parent._ref,
  "postCount": count(*[_type == "post" && references(^._id)])
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlug {
    current: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPost {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<RawSlug>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    categories: Option<Vec<Option<LocalizedText>>>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    body: Option<Value>,
}

impl RawPost {
    fn into_summary(self, locale: Locale) -> (PostSummary, Option<String>, Option<Value>) {
        let categories = self
            .categories
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|title| title.display(locale).to_string())
            .collect();

        let summary = PostSummary {
            id: self.id,
            title: self.title.unwrap_or_default(),
            slug: self.slug.and_then(|s| s.current).unwrap_or_default(),
            excerpt: self.excerpt,
            published_at: self.published_at,
            language: self.language,
            cover_image: self.cover_image,
            categories,
        };
        (summary, self.author, self.body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCategory {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<LocalizedText>,
    #[serde(default)]
    slug: Option<RawSlug>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    parent: Option<LocalizedText>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    post_count: Option<u32>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        // Prefer the stable id; the projected title is only a fallback.
        let parent = match (raw.parent_id, raw.parent) {
            (Some(id), _) => Some(ParentRef::Id(id)),
            (None, Some(title)) => Some(ParentRef::Title(
                title.display(Locale::default_locale()).to_string(),
            )),
            (None, None) => None,
        };

        Category {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            slug: raw.slug.and_then(|s| s.current).unwrap_or_default(),
            color: raw.color,
            parent,
            post_count: raw.post_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CmsClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    dataset: String,
    token: Option<String>,
}

impl CmsClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.cms_api_url.trim_end_matches('/').to_string(),
            api_version: config.cms_api_version.clone(),
            dataset: config.cms_dataset.clone(),
            token: config.cms_token.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v{}/data/{}/{}",
            self.base_url, self.api_version, action, self.dataset
        )
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, params: &[(&str, Value)]) -> Result<T> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), value.to_string()));
        }

        let mut request = self.client.get(self.endpoint("query")).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Backend { status, body });
        }

        let parsed: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(parsed.result)
    }

    async fn mutate(&self, mutations: Value) -> Result<MutateResponse> {
        let token = self.token.as_deref().ok_or_else(|| {
            ContentError::Unauthorized("CMS_TOKEN is required for content mutations".to_string())
        })?;

        let response = self
            .client
            .post(self.endpoint("mutate"))
            .query(&[("returnIds", "true")])
            .bearer_auth(token)
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Backend { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))
    }

    /// Published posts written in `locale`, newest first.
    pub async fn list_posts(&self, locale: Locale) -> Result<Vec<PostSummary>> {
        let raw: Vec<RawPost> = self
            .query(POSTS_QUERY, &[("language", json!(locale.code()))])
            .await?;
        debug!("Fetched {} posts for '{}'", raw.len(), locale);
        Ok(raw.into_iter().map(|p| p.into_summary(locale).0).collect())
    }

    /// Every post in every language (admin listing).
    pub async fn list_all_posts(&self) -> Result<Vec<PostSummary>> {
        let raw: Vec<RawPost> = self.query(ALL_POSTS_QUERY, &[]).await?;
        let locale = Locale::default_locale();
        Ok(raw.into_iter().map(|p| p.into_summary(locale).0).collect())
    }

    pub async fn get_post_by_slug(&self, slug: &str, locale: Locale) -> Result<Option<Post>> {
        let raw: Option<RawPost> = self
            .query(
                POST_BY_SLUG_QUERY,
                &[("slug", json!(slug)), ("language", json!(locale.code()))],
            )
            .await?;

        Ok(raw.map(|post| {
            let (summary, author, body) = post.into_summary(locale);
            Post {
                summary,
                author,
                body: body.unwrap_or(Value::Array(Vec::new())),
            }
        }))
    }

    pub async fn list_all_slugs(&self) -> Result<Vec<PostSlug>> {
        self.query(ALL_SLUGS_QUERY, &[]).await
    }

    /// Flat category list as stored; see [`crate::taxonomy::build_hierarchy`]
    /// for display order.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let raw: Vec<RawCategory> = self.query(CATEGORIES_QUERY, &[]).await?;
        Ok(raw.into_iter().map(Category::from).collect())
    }

    /// Create a category and return its document id.
    pub async fn create_category(&self, input: &NewCategory) -> Result<String> {
        input.validate()?;

        let mut document = json!({
            "_type": "category",
            "title": input.title.trim(),
            "slug": { "_type": "slug", "current": input.slug },
        });
        if let Some(color) = &input.color {
            document["color"] = json!(color);
        }
        if let Some(parent_id) = &input.parent_id {
            document["parent"] = json!({ "_type": "reference", "_ref": parent_id });
        }

        let response = self.mutate(json!([{ "create": document }])).await?;
        let id = response
            .results
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| ContentError::Decode("create returned no document id".to_string()))?;

        info!("Created category '{}' ({})", input.title, id);
        Ok(id)
    }

    async fn delete_document(&self, kind: &str, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ContentError::Validation(format!("{} id is required", kind)));
        }

        let response = self.mutate(json!([{ "delete": { "id": id } }])).await?;
        if response.results.is_empty() {
            return Err(ContentError::NotFound(format!("{} {}", kind, id)));
        }

        info!("Deleted {} {}", kind, id);
        Ok(())
    }

    pub async fn delete_category(&self, id: &str) -> Result<()> {
        self.delete_document("category", id).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<()> {
        self.delete_document("post", id).await
    }
}
