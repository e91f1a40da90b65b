//! Blog taxonomy: categories and their two-level display hierarchy.
//!
//! Output order is every root category alphabetically, each immediately
//! followed by its alphabetically sorted children, then every record that
//! could not be attached to a root ("orphans") in original order.

use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A display string that is either plain or keyed by locale code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    PerLocale(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Text for `locale`, falling back to the default locale, then to any
    /// available translation, then to the empty string.
    pub fn display(&self, locale: Locale) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::PerLocale(map) => map
                .get(locale.code())
                .or_else(|| map.get(Locale::default_locale().code()))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Plain(text.to_string())
    }
}

/// How a child names its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum ParentRef {
    /// Stable document id of the parent
    Id(String),
    /// Parent's display title (as returned by title-projecting queries)
    Title(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: LocalizedText,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub post_count: u32,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn display_title(&self, locale: Locale) -> &str {
        self.title.display(locale)
    }
}

/// A root and the children attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    pub root: &'a Category,
    pub children: Vec<&'a Category>,
}

/// One row of the flattened hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow<'a> {
    /// 0 for roots and orphans, 1 for attached children
    pub depth: u8,
    pub display_title: String,
    #[serde(flatten)]
    pub category: &'a Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy<'a> {
    pub groups: Vec<CategoryGroup<'a>>,
    pub orphans: Vec<&'a Category>,
    #[serde(skip)]
    locale: Locale,
}

impl<'a> Hierarchy<'a> {
    /// Roots, each followed by its children, then orphans.
    pub fn flatten(&self) -> Vec<&'a Category> {
        self.rows().into_iter().map(|row| row.category).collect()
    }

    /// Like [`Hierarchy::flatten`], with nesting depth and display title.
    pub fn rows(&self) -> Vec<CategoryRow<'a>> {
        let row = |depth: u8, category: &'a Category| CategoryRow {
            depth,
            display_title: category.display_title(self.locale).to_string(),
            category,
        };

        let mut rows = Vec::new();
        for group in &self.groups {
            rows.push(row(0, group.root));
            rows.extend(group.children.iter().map(|child| row(1, child)));
        }
        rows.extend(self.orphans.iter().map(|orphan| row(0, orphan)));
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.orphans.is_empty()
    }
}

fn sort_key(category: &Category, locale: Locale) -> String {
    category.display_title(locale).to_lowercase()
}

/// Build the two-level hierarchy of `records`.
///
/// Children are grouped by parent key in one pass. A title reference names
/// the parent by its default-locale title and joins every root whose
/// default-locale title equals it, so two roots sharing a title both receive
/// the child; an id reference joins only the root with that id. `locale`
/// only affects sorting and display. Grandchildren are not resolved and end
/// up as orphans.
pub fn build_hierarchy(records: &[Category], locale: Locale) -> Hierarchy<'_> {
    let mut roots: Vec<usize> = Vec::new();
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_title: HashMap<&str, Vec<usize>> = HashMap::new();

    for (index, category) in records.iter().enumerate() {
        match &category.parent {
            None => roots.push(index),
            Some(ParentRef::Id(id)) => by_id.entry(id.as_str()).or_default().push(index),
            Some(ParentRef::Title(title)) => {
                by_title.entry(title.as_str()).or_default().push(index)
            }
        }
    }

    roots.sort_by_cached_key(|&index| sort_key(&records[index], locale));

    let join_locale = Locale::default_locale();
    let mut placed = vec![false; records.len()];
    let mut groups = Vec::with_capacity(roots.len());

    for root_index in roots {
        let root = &records[root_index];
        placed[root_index] = true;

        let mut children: Vec<usize> = by_id
            .get(root.id.as_str())
            .into_iter()
            .chain(by_title.get(root.display_title(join_locale)))
            .flatten()
            .copied()
            .collect();
        children.sort_unstable();
        children.sort_by_cached_key(|&index| sort_key(&records[index], locale));

        for &child in &children {
            placed[child] = true;
        }

        groups.push(CategoryGroup {
            root,
            children: children.into_iter().map(|index| &records[index]).collect(),
        });
    }

    let orphans = records
        .iter()
        .zip(&placed)
        .filter(|(_, placed)| !**placed)
        .map(|(category, _)| category)
        .collect();

    Hierarchy {
        groups,
        orphans,
        locale,
    }
}

/// Owned, display-ordered copy of `records`.
pub fn order_categories(records: &[Category], locale: Locale) -> Vec<Category> {
    build_hierarchy(records, locale)
        .flatten()
        .into_iter()
        .cloned()
        .collect()
}
