use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::debug;

use super::{ListResponse, PageResponse, RefreshResponse};
use crate::config::{SELLER_SELECT, SELLER_TABLE};
use crate::discovery::{Category, Criteria, SortKey};
use crate::error::HubError;
use crate::router::{HubState, PageLimits};
use crate::service::CollectionKind;
use crate::supabase::Select;
use crate::types::{Practitioner, SellerRow, Therapy};

/// Query string shared by every paginated listing.
#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl DiscoveryQuery {
    /// Validate and turn into pipeline criteria. `per_page` above the limit is capped.
    pub fn into_criteria(self, limits: PageLimits) -> Result<Criteria, HubError> {
        let page_size = self
            .per_page
            .map_or(limits.default_size.get(), |n| n.min(limits.max_size.max(1)));
        let mut criteria = Criteria::with_page_size(page_size)?;

        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(HubError::InvalidCriteria("page starts at 1".to_string()));
        }
        criteria = criteria.page(page);

        if let Some(q) = self.q {
            criteria = criteria.text(q);
        }
        if let Some(category) = self.category.as_deref() {
            criteria = criteria.category(Category::parse(category));
        }
        if let Some(location) = self.location {
            criteria = criteria.location(location);
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            criteria = criteria.sort(sort.parse::<SortKey>()?);
        }
        Ok(criteria)
    }

    /// Like [`Self::into_criteria`], refusing sort keys practitioners have no value for.
    pub fn into_practitioner_criteria(self, limits: PageLimits) -> Result<Criteria, HubError> {
        let criteria = self.into_criteria(limits)?;
        if criteria.sort == SortKey::Likes {
            return Err(HubError::InvalidCriteria(
                "practitioners cannot be sorted by likes".to_string(),
            ));
        }
        Ok(criteria)
    }
}

/// GET /practitioners
pub async fn list_practitioners(
    State(state): State<HubState>,
    query: Result<Query<DiscoveryQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Practitioner>>, HubError> {
    let Query(query) = query?;
    let criteria = query.into_practitioner_criteria(state.limits)?;
    let view = state.catalog.practitioners().await?;
    debug!(?criteria, cached = view.items.len(), "discovering practitioners");
    Ok(Json(PageResponse::derive(&view, &criteria)))
}

/// GET /practitioners/featured
pub async fn featured_practitioners(
    State(state): State<HubState>,
) -> Result<Json<ListResponse<Practitioner>>, HubError> {
    let view = state.catalog.practitioners().await?;
    let featured = view
        .items
        .iter()
        .filter(|p| p.featured)
        .take(state.featured_limit)
        .cloned()
        .collect();
    Ok(Json(ListResponse::from_view(&view, featured)))
}

/// GET /practitioners/{id}
///
/// Served from the snapshot; falls back to a direct read for listings beyond the cached cap.
pub async fn get_practitioner(
    State(state): State<HubState>,
    Path(id): Path<i64>,
) -> Result<Json<Practitioner>, HubError> {
    let view = state.catalog.practitioners().await?;
    if let Some(found) = view.items.iter().find(|p| p.id == id) {
        return Ok(Json(found.clone()));
    }

    let query = Select::columns(SELLER_SELECT).eq("id", id).limit(1);
    let rows: Vec<SellerRow> = state.store.select(SELLER_TABLE, &query, None).await?;
    rows.into_iter()
        .next()
        .map(|row| Json(Practitioner::from(row)))
        .ok_or_else(|| HubError::NotFound(format!("practitioner {id}")))
}

/// GET /therapies
pub async fn list_therapies(
    State(state): State<HubState>,
) -> Result<Json<ListResponse<Therapy>>, HubError> {
    let view = state.catalog.therapies().await?;
    let items = view.items.as_ref().clone();
    Ok(Json(ListResponse::from_view(&view, items)))
}

/// GET /therapies/{path}/practitioners
pub async fn practitioners_by_therapy(
    State(state): State<HubState>,
    Path(therapy): Path<String>,
    query: Result<Query<DiscoveryQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Practitioner>>, HubError> {
    let Query(query) = query?;
    let therapies = state.catalog.therapies().await?;
    let therapy = therapies
        .items
        .iter()
        .find(|t| t.is_named(&therapy))
        .ok_or_else(|| HubError::NotFound(format!("therapy `{therapy}`")))?;

    let criteria = query
        .into_practitioner_criteria(state.limits)?
        .category(Category::Named(therapy.name.clone()));
    let view = state.catalog.practitioners().await?;
    Ok(Json(PageResponse::derive(&view, &criteria)))
}

/// POST /refresh/{collection}
pub async fn refresh_collection(
    State(state): State<HubState>,
    Path(collection): Path<String>,
) -> Result<Json<RefreshResponse>, HubError> {
    let kind: CollectionKind = collection.parse()?;
    let status = state.catalog.reload(kind).await?;
    Ok(Json(RefreshResponse::new(kind, &status)))
}
