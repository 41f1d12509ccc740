use chrono::{DateTime, Utc};
use futures::future::join_all;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::HubError;
use crate::service::source::{CatalogSource, Collection, CollectionKind};
use crate::types::{Post, PostBoard, Practitioner, Therapy};

/// Load state of one cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Unloaded,
    Loaded,
    /// The last refresh failed; the previous snapshot (possibly empty) is still served.
    Errored { error: String },
}

impl CacheStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CacheStatus::Unloaded => "unloaded",
            CacheStatus::Loaded => "loaded",
            CacheStatus::Errored { .. } => "errored",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CacheStatus::Errored { error } => Some(error),
            _ => None,
        }
    }
}

/// Read-only view handed to callers.
#[derive(Debug, Clone)]
pub struct CacheView<T> {
    pub items: Arc<Vec<T>>,
    pub status: CacheStatus,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Messages handled by the catalog actor.
#[derive(Debug)]
pub enum CatalogMessage {
    GetPractitioners(RpcReplyPort<CacheView<Practitioner>>),
    GetTherapies(RpcReplyPort<CacheView<Therapy>>),
    GetPosts(PostBoard, RpcReplyPort<CacheView<Post>>),
    /// Start a refresh and return immediately.
    Refresh(CollectionKind),
    /// Start a refresh and reply with the resulting status once applied.
    Reload(CollectionKind, RpcReplyPort<CacheStatus>),

    // Internal messages (sent by the actor itself)
    /// A fetch finished; replace the snapshot or record the failure.
    RefreshComplete {
        kind: CollectionKind,
        result: Result<Collection, HubError>,
        reply: Option<RpcReplyPort<CacheStatus>>,
    },
}

/// Handle for interacting with the catalog actor.
#[derive(Clone)]
pub struct CatalogHandle {
    actor: ActorRef<CatalogMessage>,
}

impl CatalogHandle {
    /// Practitioner snapshot, loading it first if it was never fetched.
    pub async fn practitioners(&self) -> Result<CacheView<Practitioner>, HubError> {
        let view = self.call_practitioners().await?;
        if view.status != CacheStatus::Unloaded {
            return Ok(view);
        }
        self.reload(CollectionKind::Practitioners).await?;
        self.call_practitioners().await
    }

    pub async fn therapies(&self) -> Result<CacheView<Therapy>, HubError> {
        let view = self.call_therapies().await?;
        if view.status != CacheStatus::Unloaded {
            return Ok(view);
        }
        self.reload(CollectionKind::Therapies).await?;
        self.call_therapies().await
    }

    pub async fn posts(&self, board: PostBoard) -> Result<CacheView<Post>, HubError> {
        let view = self.call_posts(board).await?;
        if view.status != CacheStatus::Unloaded {
            return Ok(view);
        }
        self.reload(board.into()).await?;
        self.call_posts(board).await
    }

    /// Fire-and-forget refresh; a slower response simply lands later.
    pub fn refresh(&self, kind: CollectionKind) {
        if let Err(e) = ractor::cast!(self.actor, CatalogMessage::Refresh(kind)) {
            warn!(%kind, error = %e, "catalog actor unreachable; refresh dropped");
        }
    }

    /// Refresh and wait until the result has been applied.
    pub async fn reload(&self, kind: CollectionKind) -> Result<CacheStatus, HubError> {
        ractor::call!(self.actor, CatalogMessage::Reload, kind)
            .map_err(|e| HubError::ActorError(format!("Reload RPC failed: {e}")))
    }

    /// Reload every collection concurrently.
    pub async fn reload_all(&self) -> Vec<(CollectionKind, Result<CacheStatus, HubError>)> {
        let results = join_all(CollectionKind::ALL.map(|kind| self.reload(kind))).await;
        CollectionKind::ALL.into_iter().zip(results).collect()
    }

    async fn call_practitioners(&self) -> Result<CacheView<Practitioner>, HubError> {
        ractor::call!(self.actor, CatalogMessage::GetPractitioners)
            .map_err(|e| HubError::ActorError(format!("GetPractitioners RPC failed: {e}")))
    }

    async fn call_therapies(&self) -> Result<CacheView<Therapy>, HubError> {
        ractor::call!(self.actor, CatalogMessage::GetTherapies)
            .map_err(|e| HubError::ActorError(format!("GetTherapies RPC failed: {e}")))
    }

    async fn call_posts(&self, board: PostBoard) -> Result<CacheView<Post>, HubError> {
        ractor::call!(self.actor, CatalogMessage::GetPosts, board)
            .map_err(|e| HubError::ActorError(format!("GetPosts RPC failed: {e}")))
    }
}

struct Slot<T> {
    items: Arc<Vec<T>>,
    status: CacheStatus,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            status: CacheStatus::Unloaded,
            refreshed_at: None,
        }
    }
}

impl<T> Slot<T> {
    fn view(&self) -> CacheView<T> {
        CacheView {
            items: self.items.clone(),
            status: self.status.clone(),
            refreshed_at: self.refreshed_at,
        }
    }

    fn replace(&mut self, items: Vec<T>) {
        self.items = Arc::new(items);
        self.status = CacheStatus::Loaded;
        self.refreshed_at = Some(Utc::now());
    }

    /// Keep the previous snapshot; only the status changes.
    fn fail(&mut self, error: String) {
        self.status = CacheStatus::Errored { error };
    }
}

/// Internal state held by the ractor-driven catalog actor
struct CatalogState {
    source: Arc<dyn CatalogSource>,
    practitioners: Slot<Practitioner>,
    therapies: Slot<Therapy>,
    forum: Slot<Post>,
    feed: Slot<Post>,
}

impl CatalogState {
    fn posts_mut(&mut self, board: PostBoard) -> &mut Slot<Post> {
        match board {
            PostBoard::Forum => &mut self.forum,
            PostBoard::Feed => &mut self.feed,
        }
    }

    fn status_of(&self, kind: CollectionKind) -> CacheStatus {
        match kind {
            CollectionKind::Practitioners => self.practitioners.status.clone(),
            CollectionKind::Therapies => self.therapies.status.clone(),
            CollectionKind::Forum => self.forum.status.clone(),
            CollectionKind::Feed => self.feed.status.clone(),
        }
    }

    fn fail(&mut self, kind: CollectionKind, error: String) {
        match kind {
            CollectionKind::Practitioners => self.practitioners.fail(error),
            CollectionKind::Therapies => self.therapies.fail(error),
            CollectionKind::Forum => self.forum.fail(error),
            CollectionKind::Feed => self.feed.fail(error),
        }
    }

    fn apply(&mut self, collection: Collection) {
        match collection {
            Collection::Practitioners(items) => self
                .practitioners
                .replace(unique_by_id(items, |p| p.id, CollectionKind::Practitioners)),
            Collection::Therapies(items) => self
                .therapies
                .replace(unique_by_id(items, |t| t.id, CollectionKind::Therapies)),
            Collection::Posts(board, items) => {
                let items = unique_by_id(items, |p| p.id, board.into());
                self.posts_mut(board).replace(items)
            }
        }
    }
}

/// Drop repeated ids; the first occurrence wins.
fn unique_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> i64, kind: CollectionKind) -> Vec<T> {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<T> = items.into_iter().filter(|item| seen.insert(id(item))).collect();
    if unique.len() != before {
        warn!(
            %kind,
            dropped = before - unique.len(),
            "snapshot contained duplicate ids"
        );
    }
    unique
}

/// ractor-based catalog actor
struct CatalogActor;

#[ractor::async_trait]
impl Actor for CatalogActor {
    type Msg = CatalogMessage;
    type State = CatalogState;
    type Arguments = Arc<dyn CatalogSource>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        source: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("CatalogActor started; collections unloaded until first refresh");
        Ok(CatalogState {
            source,
            practitioners: Slot::default(),
            therapies: Slot::default(),
            forum: Slot::default(),
            feed: Slot::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CatalogMessage::GetPractitioners(rp) => {
                let _ = rp.send(state.practitioners.view());
            }
            CatalogMessage::GetTherapies(rp) => {
                let _ = rp.send(state.therapies.view());
            }
            CatalogMessage::GetPosts(board, rp) => {
                let view = match board {
                    PostBoard::Forum => state.forum.view(),
                    PostBoard::Feed => state.feed.view(),
                };
                let _ = rp.send(view);
            }
            CatalogMessage::Refresh(kind) => {
                self.start_fetch(state, &myself, kind, None);
            }
            CatalogMessage::Reload(kind, rp) => {
                self.start_fetch(state, &myself, kind, Some(rp));
            }
            CatalogMessage::RefreshComplete {
                kind,
                result,
                reply,
            } => {
                match result {
                    Ok(collection) => {
                        state.apply(collection);
                        info!(%kind, "collection refreshed");
                    }
                    Err(e) => {
                        warn!(%kind, error = %e, "refresh failed; keeping previous snapshot");
                        state.fail(kind, e.to_string());
                    }
                }
                if let Some(rp) = reply {
                    let _ = rp.send(state.status_of(kind));
                }
            }
        }
        Ok(())
    }
}

impl CatalogActor {
    /// Fetch off the actor; the result comes back as `RefreshComplete`.
    fn start_fetch(
        &self,
        state: &CatalogState,
        myself: &ActorRef<CatalogMessage>,
        kind: CollectionKind,
        reply: Option<RpcReplyPort<CacheStatus>>,
    ) {
        let source = state.source.clone();
        let me = myself.clone();
        debug!(%kind, "fetch dispatched");
        tokio::spawn(async move {
            let result = source.fetch(kind).await;
            let _ = ractor::cast!(
                me,
                CatalogMessage::RefreshComplete {
                    kind,
                    result,
                    reply
                }
            );
        });
    }
}

/// Async spawn of the catalog actor and return a handle.
pub async fn spawn(source: Arc<dyn CatalogSource>) -> Result<CatalogHandle, HubError> {
    let (actor, _jh) = Actor::spawn(None, CatalogActor, source)
        .await
        .map_err(|e| HubError::ActorError(format!("failed to spawn CatalogActor: {e}")))?;
    Ok(CatalogHandle { actor })
}
