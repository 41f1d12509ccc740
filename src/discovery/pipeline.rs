use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use super::criteria::{Category, Criteria, SortKey};
use crate::types::{Post, Practitioner, same_name};

/// A record the pipeline can filter and order.
pub trait Discoverable {
    /// Whether the record belongs to `category`. Matching is case-insensitive.
    fn matches_category(&self, category: &str) -> bool;

    /// Fields searched by the free-text query.
    fn search_fields(&self) -> Vec<&str>;

    fn location(&self) -> Option<&str> {
        None
    }

    fn timestamp(&self) -> Option<DateTime<Utc>>;

    fn engagement(&self) -> u64;

    /// Like counter, for record kinds that have one.
    fn likes(&self) -> Option<u64> {
        None
    }

    fn rating(&self) -> Option<f64> {
        None
    }

    fn price(&self) -> Option<f64> {
        None
    }
}

impl Discoverable for Practitioner {
    fn matches_category(&self, category: &str) -> bool {
        self.has_specialty(category)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.title.as_str()]
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn engagement(&self) -> u64 {
        u64::from(self.reviews)
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn price(&self) -> Option<f64> {
        self.price
    }
}

impl Discoverable for Post {
    fn matches_category(&self, category: &str) -> bool {
        same_name(&self.category, category)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.content.as_str(), self.username.as_str()]
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn engagement(&self) -> u64 {
        u64::from(self.replies)
    }

    fn likes(&self) -> Option<u64> {
        Some(u64::from(self.likes))
    }
}

/// One page of a filtered, ordered collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually served, after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; `0` for an empty result.
    pub total_pages: usize,
}

/// Run the pipeline: category, text and location filters, stable sort, then slice.
pub fn discover<T>(items: &[T], criteria: &Criteria) -> Page<T>
where
    T: Discoverable + Clone,
{
    let needle = criteria.text_query.trim().to_lowercase();
    let location = criteria
        .location
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());

    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| match &criteria.category {
            Category::All => true,
            Category::Named(category) => item.matches_category(category),
        })
        .filter(|item| {
            needle.is_empty()
                || item
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .filter(|item| match &location {
            None => true,
            Some(wanted) => item
                .location()
                .is_some_and(|l| l.to_lowercase().contains(wanted.as_str())),
        })
        .collect();

    // `sort_by` is stable: equal keys keep snapshot order.
    matched.sort_by(|a, b| compare(*a, *b, criteria.sort));

    let page_size = criteria.page_size.get();
    let total_items = matched.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = criteria.page.clamp(1, total_pages.max(1));

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

fn compare<T: Discoverable>(a: &T, b: &T, key: SortKey) -> Ordering {
    match key {
        SortKey::Recent => missing_last(a.timestamp(), b.timestamp(), |a, b| b.cmp(&a)),
        SortKey::Oldest => missing_last(a.timestamp(), b.timestamp(), |a, b| a.cmp(&b)),
        SortKey::Popular => b.engagement().cmp(&a.engagement()),
        SortKey::Likes => missing_last(a.likes(), b.likes(), |a, b| b.cmp(&a)),
        SortKey::TopRated => missing_last(a.rating(), b.rating(), |a, b| b.total_cmp(&a)),
        SortKey::PriceAsc => missing_last(a.price(), b.price(), |a, b| a.total_cmp(&b)),
        SortKey::PriceDesc => missing_last(a.price(), b.price(), |a, b| b.total_cmp(&a)),
    }
}

/// Records without the sort key go after every record that has it.
fn missing_last<V>(a: Option<V>, b: Option<V>, cmp: impl FnOnce(V, V) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
