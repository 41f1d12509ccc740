pub mod community;
pub mod discovery;
pub mod profile;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discovery::{Criteria, Discoverable, Page, discover};
use crate::service::{CacheStatus, CacheView, CollectionKind};

/// Derived page plus the load state of the snapshot it came from.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub page: Page<T>,
}

impl<T> PageResponse<T>
where
    T: Discoverable + Clone,
{
    pub fn derive(view: &CacheView<T>, criteria: &Criteria) -> Self {
        Self {
            status: view.status.label(),
            error: view.status.error().map(str::to_string),
            refreshed_at: view.refreshed_at,
            page: discover(view.items.as_slice(), criteria),
        }
    }
}

/// Unpaginated list plus load state.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub items: Vec<T>,
}

impl<T: Clone> ListResponse<T> {
    pub fn from_view(view: &CacheView<T>, items: Vec<T>) -> Self {
        Self {
            status: view.status.label(),
            error: view.status.error().map(str::to_string),
            refreshed_at: view.refreshed_at,
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub collection: CollectionKind,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshResponse {
    pub fn new(collection: CollectionKind, status: &CacheStatus) -> Self {
        Self {
            collection,
            status: status.label(),
            error: status.error().map(str::to_string),
        }
    }
}
