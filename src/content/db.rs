//! Client for the relational REST backend (PostgREST-style `/rest/v1/{table}`).

use super::{
    Bug, ContentError, Idea, ListFilter, NewBug, NewIdea, NewRoadmapItem, Page, Result,
    RoadmapItem,
};
use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

const IDEAS_TABLE: &str = "ideas";
const BUGS_TABLE: &str = "bugs";
const ROADMAP_TABLE: &str = "roadmap_items";

/// Escape LIKE wildcards and drop characters that would break out of a
/// filter expression.
pub fn escape_search(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.trim().chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ',' | '(' | ')' | '"' | '*' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `or=(...)` filter matching the term in title or description.
pub fn search_filter(term: &str) -> Option<String> {
    let escaped = escape_search(term);
    if escaped.is_empty() {
        return None;
    }
    Some(format!(
        "(title.ilike.*{0}*,description.ilike.*{0}*)",
        escaped
    ))
}

/// Zero-based offset and limit for a one-based page number.
pub fn page_range(page: u32, page_size: u32) -> (u64, u64) {
    let page = u64::from(page.max(1));
    let size = u64::from(page_size.max(1));
    ((page - 1) * size, size)
}

/// Total row count from a `Content-Range` header such as `0-9/42` or `*/0`.
pub fn parse_total(content_range: &str) -> Option<u64> {
    content_range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}

#[derive(Debug, Clone)]
pub struct DbClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl DbClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.db_url.trim_end_matches('/').to_string(),
            anon_key: config.db_anon_key.clone(),
            service_key: config.db_service_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn headers(&self, write: bool) -> Result<HeaderMap> {
        let key = if write {
            self.service_key.as_deref().unwrap_or(&self.anon_key)
        } else {
            &self.anon_key
        };

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(key)?);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&format!("Bearer {}", key))?,
        );
        Ok(headers)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ContentError::Backend { status, body })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))
    }

    async fn select_page<T: DeserializeOwned>(
        &self,
        table: &str,
        order: &str,
        filter: &ListFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<T>> {
        let (offset, limit) = page_range(page, page_size);

        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", order.to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(status) = filter.status.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("status", format!("eq.{}", status.trim())));
        }
        if let Some(or) = filter.search.as_deref().and_then(search_filter) {
            params.push(("or", or));
        }

        let response = self
            .client
            .get(self.table_url(table))
            .headers(self.headers(false)?)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total);
        let items: Vec<T> = Self::decode(response).await?;
        let total = total.unwrap_or(offset + items.len() as u64);

        debug!("Fetched {} rows from '{}' (total {})", items.len(), table, total);
        Ok(Page::new(items, page.max(1), page_size, total))
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.table_url(table))
            .headers(self.headers(true)?)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<T> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(ContentError::Decode(format!(
                "insert into '{}' returned no rows",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete(&self, table: &str, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.table_url(table))
            .headers(self.headers(true)?)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let rows: Vec<serde_json::Value> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(ContentError::NotFound(format!("{} {}", table, id)));
        }
        info!("Deleted {} {}", table, id);
        Ok(())
    }

    // ==================== Reads ====================

    /// Ideas, most voted first.
    pub async fn list_ideas(
        &self,
        filter: &ListFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Idea>> {
        self.select_page(IDEAS_TABLE, "votes.desc,created_at.desc", filter, page, page_size)
            .await
    }

    /// Bug reports, newest first.
    pub async fn list_bugs(&self, filter: &ListFilter, page: u32, page_size: u32) -> Result<Page<Bug>> {
        self.select_page(BUGS_TABLE, "created_at.desc", filter, page, page_size)
            .await
    }

    pub async fn list_roadmap_items(&self) -> Result<Vec<RoadmapItem>> {
        let response = self
            .client
            .get(self.table_url(ROADMAP_TABLE))
            .headers(self.headers(false)?)
            .query(&[("select", "*"), ("order", "position.asc,id.asc")])
            .send()
            .await?;
        let response = Self::check(response).await?;
        Self::decode(response).await
    }

    // ==================== Mutations ====================

    pub async fn create_idea(&self, input: &NewIdea) -> Result<Idea> {
        input.validate()?;
        let idea: Idea = self.insert(IDEAS_TABLE, input).await?;
        info!("Created idea {} '{}'", idea.id, idea.title);
        Ok(idea)
    }

    pub async fn create_bug(&self, input: &NewBug) -> Result<Bug> {
        input.validate()?;
        let bug: Bug = self.insert(BUGS_TABLE, input).await?;
        info!("Created bug {} '{}'", bug.id, bug.title);
        Ok(bug)
    }

    pub async fn create_roadmap_item(&self, input: &NewRoadmapItem) -> Result<RoadmapItem> {
        input.validate()?;
        let item: RoadmapItem = self.insert(ROADMAP_TABLE, input).await?;
        info!("Created roadmap item {} '{}'", item.id, item.title);
        Ok(item)
    }

    pub async fn delete_roadmap_item(&self, id: i64) -> Result<()> {
        self.delete(ROADMAP_TABLE, id).await
    }

    pub async fn delete_idea(&self, id: i64) -> Result<()> {
        self.delete(IDEAS_TABLE, id).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ContentError::Unauthorized("API key contains invalid characters".to_string()))
}
