//! Content fetch facade over the two external backends.
//!
//! - `cms`: the document store holding posts and categories
//! - `db`: the relational REST backend holding ideas, bug reports and
//!   roadmap items
//!
//! This layer only shapes query parameters and maps backend records into
//! the types below. Mutations are forwarded once, never retried; failures
//! come back as [`ContentError`] for the caller to surface.

pub mod cms;
pub mod db;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cms::CmsClient;
pub use db::DbClient;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("missing credentials: {0}")]
    Unauthorized(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

// ==================== Blog ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub cover_image: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub author: Option<String>,
    /// Rich-text body as stored by the content backend
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSlug {
    pub slug: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Document id of the parent category
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("slug", &self.slug)?;
        if !is_valid_slug(&self.slug) {
            return Err(ContentError::Validation(format!(
                "slug '{}' must be lowercase words separated by hyphens",
                self.slug
            )));
        }
        Ok(())
    }
}

fn is_valid_slug(slug: &str) -> bool {
    use regex::Regex;
    use std::sync::OnceLock;

    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    SLUG_REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"))
        .is_match(slug)
}

// ==================== Community ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub votes: i32,
    #[serde(default)]
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdea {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub author_name: Option<String>,
}

impl NewIdea {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBug {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
}

impl NewBug {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("description", &self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapStatus {
    Planned,
    InProgress,
    Completed,
}

impl RoadmapStatus {
    pub const ALL: [RoadmapStatus; 3] = [
        RoadmapStatus::Planned,
        RoadmapStatus::InProgress,
        RoadmapStatus::Completed,
    ];

    /// Message key for the column heading
    pub fn message_key(&self) -> &'static str {
        match self {
            RoadmapStatus::Planned => "roadmap.planned",
            RoadmapStatus::InProgress => "roadmap.inProgress",
            RoadmapStatus::Completed => "roadmap.completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: RoadmapStatus,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoadmapItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: RoadmapStatus,
    #[serde(default)]
    pub quarter: Option<String>,
}

impl NewRoadmapItem {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)
    }
}

// ==================== Listing ====================

/// Filters accepted by community listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            items,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(u64::from(page_size)),
        }
    }

    /// Empty page, rendered when the backend could not be reached.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), page, page_size, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_idea_requires_title_and_description() {
        let idea = NewIdea {
            title: "  ".to_string(),
            description: "Something".to_string(),
            author_name: None,
        };
        let err = idea.validate().unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
        assert_eq!(err.to_string(), "title is required");

        let idea = NewIdea {
            title: "Dark mode".to_string(),
            description: "".to_string(),
            author_name: None,
        };
        assert_eq!(idea.validate().unwrap_err().to_string(), "description is required");
    }

    #[test]
    fn test_new_category_slug_shape() {
        let mut category = NewCategory {
            title: "Machine Learning".to_string(),
            slug: "machine-learning".to_string(),
            color: None,
            parent_id: None,
        };
        assert!(category.validate().is_ok());

        category.slug = "Machine Learning".to_string();
        assert!(category.validate().is_err());

        category.slug = "trailing-".to_string();
        assert!(category.validate().is_err());
    }

    #[test]
    fn test_page_counts_total_pages() {
        let page: Page<u8> = Page::new(vec![1, 2], 1, 10, 21);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::empty(1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_roadmap_status_serde() {
        assert_eq!(
            serde_json::to_string(&RoadmapStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: RoadmapStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, RoadmapStatus::Completed);
    }

    #[test]
    fn test_post_serializes_flat() {
        let post = Post {
            summary: PostSummary {
                id: "p1".to_string(),
                title: "Hello".to_string(),
                slug: "hello".to_string(),
                excerpt: None,
                published_at: None,
                language: Some("en".to_string()),
                cover_image: None,
                categories: vec![],
            },
            author: None,
            body: serde_json::json!([]),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["slug"], "hello");
        assert!(json.get("summary").is_none());
    }
}
