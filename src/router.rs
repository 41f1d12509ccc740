use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::Config;
use crate::handlers::{community, discovery, profile};
use crate::service::CatalogHandle;
use crate::supabase::StoreClient;

/// Avatars are the largest bodies accepted.
const BODY_LIMIT: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: NonZeroUsize,
    pub max_size: usize,
}

impl PageLimits {
    pub fn from_config(cfg: &Config) -> Self {
        let default_size = cfg.default_page_size();
        Self {
            default_size,
            max_size: cfg.max_page_size.max(default_size.get()),
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HubState {
    pub catalog: CatalogHandle,
    pub store: StoreClient,
    pub limits: PageLimits,
    pub storage_bucket: Arc<str>,
    pub featured_limit: usize,
}

impl HubState {
    pub fn new(catalog: CatalogHandle, store: StoreClient, cfg: &Config) -> Self {
        Self {
            catalog,
            store,
            limits: PageLimits::from_config(cfg),
            storage_bucket: Arc::from(cfg.storage_bucket.as_str()),
            featured_limit: cfg.featured_limit,
        }
    }
}

pub fn hub_router(state: HubState) -> Router {
    Router::new()
        .route("/practitioners", get(discovery::list_practitioners))
        .route(
            "/practitioners/featured",
            get(discovery::featured_practitioners),
        )
        .route("/practitioners/{id}", get(discovery::get_practitioner))
        .route("/therapies", get(discovery::list_therapies))
        .route(
            "/therapies/{path}/practitioners",
            get(discovery::practitioners_by_therapy),
        )
        .route(
            "/forum",
            get(community::list_forum).post(community::create_forum_post),
        )
        .route(
            "/feed",
            get(community::list_feed).post(community::create_feed_post),
        )
        .route(
            "/forum/{id}/replies",
            get(community::list_replies).post(community::create_reply),
        )
        .route("/refresh/{collection}", post(discovery::refresh_collection))
        .route("/me", get(profile::get_me).patch(profile::update_me))
        .route("/me/avatar", put(profile::upload_avatar))
        .route("/registration", post(profile::register))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
