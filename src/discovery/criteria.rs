use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::HubError;
use crate::types::same_name;

/// Category selector. `All` disables the category filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Named(String),
}

impl Category {
    /// `""` and `"All"` (any casing) select everything.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || same_name(trimmed, "all") {
            Category::All
        } else {
            Category::Named(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first.
    #[default]
    Recent,
    /// Oldest first.
    Oldest,
    /// Highest engagement first (replies for posts, reviews for practitioners).
    #[serde(alias = "replies")]
    Popular,
    /// Most liked first. Only posts carry a like counter.
    Likes,
    TopRated,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortKey {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "newest" => Ok(SortKey::Recent),
            "oldest" => Ok(SortKey::Oldest),
            "popular" | "replies" => Ok(SortKey::Popular),
            "likes" => Ok(SortKey::Likes),
            "top_rated" | "rating" => Ok(SortKey::TopRated),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            other => Err(HubError::InvalidCriteria(format!("unknown sort key `{other}`"))),
        }
    }
}

/// User-selected tuple driving the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub text_query: String,
    pub category: Category,
    pub location: Option<String>,
    pub sort: SortKey,
    /// 1-based. Values past the last page are clamped by the pipeline.
    pub page: usize,
    pub page_size: NonZeroUsize,
}

impl Criteria {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            text_query: String::new(),
            category: Category::All,
            location: None,
            sort: SortKey::default(),
            page: 1,
            page_size,
        }
    }

    /// Checked constructor for sizes coming from outside the process.
    pub fn with_page_size(page_size: usize) -> Result<Self, HubError> {
        NonZeroUsize::new(page_size)
            .map(Self::new)
            .ok_or_else(|| HubError::InvalidCriteria("page size must be greater than zero".into()))
    }

    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.text_query = query.into();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = (!location.trim().is_empty()).then_some(location);
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }
}
