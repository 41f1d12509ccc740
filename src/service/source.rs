use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::config::{
    Config, FEED_POSTS_TABLE, FORUM_POSTS_TABLE, POST_FETCH_LIMIT, SELLER_SELECT, SELLER_TABLE,
    THERAPIES_TABLE,
};
use crate::error::HubError;
use crate::fixtures;
use crate::supabase::{Direction, Select, StoreClient};
use crate::types::{Post, PostBoard, Practitioner, SellerRow, Therapy};

/// The cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Practitioners,
    Therapies,
    Forum,
    Feed,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Practitioners,
        CollectionKind::Therapies,
        CollectionKind::Forum,
        CollectionKind::Feed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Practitioners => "practitioners",
            CollectionKind::Therapies => "therapies",
            CollectionKind::Forum => "forum",
            CollectionKind::Feed => "feed",
        }
    }
}

impl From<PostBoard> for CollectionKind {
    fn from(board: PostBoard) -> Self {
        match board {
            PostBoard::Forum => CollectionKind::Forum,
            PostBoard::Feed => CollectionKind::Feed,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| HubError::NotFound(format!("unknown collection `{s}`")))
    }
}

/// A full snapshot of one collection.
#[derive(Debug, Clone)]
pub enum Collection {
    Practitioners(Vec<Practitioner>),
    Therapies(Vec<Therapy>),
    Posts(PostBoard, Vec<Post>),
}

/// Where snapshots come from.
#[ractor::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, kind: CollectionKind) -> Result<Collection, HubError>;
}

/// Remote tables, with forum/feed optionally served from bundled fixtures.
pub struct StoreSource {
    client: StoreClient,
    practitioner_limit: usize,
    fixtures_dir: Option<PathBuf>,
}

impl StoreSource {
    pub fn new(client: StoreClient, cfg: &Config) -> Self {
        Self {
            client,
            practitioner_limit: cfg.practitioner_limit.max(1),
            fixtures_dir: cfg.fixtures_dir.clone(),
        }
    }

    async fn fetch_posts(&self, board: PostBoard) -> Result<Vec<Post>, HubError> {
        if let Some(dir) = self.fixtures_dir.as_deref() {
            debug!(%board, path = %dir.display(), "reading posts from fixtures");
            return fixtures::load_board(dir, board).await;
        }
        let table = match board {
            PostBoard::Forum => FORUM_POSTS_TABLE,
            PostBoard::Feed => FEED_POSTS_TABLE,
        };
        let query = Select::default()
            .order("created_at", Direction::Desc)
            .limit(POST_FETCH_LIMIT);
        self.client.select(table, &query, None).await
    }
}

#[ractor::async_trait]
impl CatalogSource for StoreSource {
    async fn fetch(&self, kind: CollectionKind) -> Result<Collection, HubError> {
        match kind {
            CollectionKind::Practitioners => {
                let query = Select::columns(SELLER_SELECT)
                    .order("id", Direction::Asc)
                    .limit(self.practitioner_limit);
                let rows: Vec<SellerRow> = self.client.select(SELLER_TABLE, &query, None).await?;
                Ok(Collection::Practitioners(
                    rows.into_iter().map(Practitioner::from).collect(),
                ))
            }
            CollectionKind::Therapies => {
                let query = Select::default().order("name", Direction::Asc);
                let rows: Vec<Therapy> = self.client.select(THERAPIES_TABLE, &query, None).await?;
                Ok(Collection::Therapies(rows))
            }
            CollectionKind::Forum => Ok(Collection::Posts(
                PostBoard::Forum,
                self.fetch_posts(PostBoard::Forum).await?,
            )),
            CollectionKind::Feed => Ok(Collection::Posts(
                PostBoard::Feed,
                self.fetch_posts(PostBoard::Feed).await?,
            )),
        }
    }
}
