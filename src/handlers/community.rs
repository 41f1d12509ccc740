use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::info;

use super::PageResponse;
use super::discovery::DiscoveryQuery;
use crate::config::{FEED_POSTS_TABLE, FORUM_POSTS_TABLE, FORUM_REPLIES_TABLE, MAX_POST_LENGTH};
use crate::error::HubError;
use crate::middleware::auth::AuthSession;
use crate::router::HubState;
use crate::service::CollectionKind;
use crate::supabase::{Direction, Select};
use crate::types::{NewPost, NewReply, Post, PostBoard, Reply};

async fn list_board(
    state: &HubState,
    board: PostBoard,
    query: DiscoveryQuery,
) -> Result<Json<PageResponse<Post>>, HubError> {
    let criteria = query.into_criteria(state.limits)?;
    let view = state.catalog.posts(board).await?;
    Ok(Json(PageResponse::derive(&view, &criteria)))
}

/// GET /forum
pub async fn list_forum(
    State(state): State<HubState>,
    query: Result<Query<DiscoveryQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Post>>, HubError> {
    let Query(query) = query?;
    list_board(&state, PostBoard::Forum, query).await
}

/// GET /feed
pub async fn list_feed(
    State(state): State<HubState>,
    query: Result<Query<DiscoveryQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Post>>, HubError> {
    let Query(query) = query?;
    list_board(&state, PostBoard::Feed, query).await
}

fn check_content(content: &str) -> Result<(), HubError> {
    if content.trim().is_empty() {
        return Err(HubError::Validation("content is required".to_string()));
    }
    if content.chars().count() > MAX_POST_LENGTH {
        return Err(HubError::Validation(format!(
            "content exceeds {MAX_POST_LENGTH} characters"
        )));
    }
    Ok(())
}

async fn create_post(
    state: &HubState,
    session: AuthSession,
    board: PostBoard,
    mut post: NewPost,
) -> Result<(StatusCode, Json<Post>), HubError> {
    check_content(&post.content)?;
    post.category = post.category.trim().to_string();
    if post.category.is_empty() {
        return Err(HubError::Validation("category is required".to_string()));
    }
    // Authorship always comes from the session, never from the body.
    post.user_id = session.user.id.clone();
    if post.username.trim().is_empty() {
        post.username = session.display_name();
    }

    let table = match board {
        PostBoard::Forum => FORUM_POSTS_TABLE,
        PostBoard::Feed => FEED_POSTS_TABLE,
    };
    let rows: Vec<Post> = state
        .store
        .insert(table, &post, Some(&session.access_token))
        .await?;
    let created = rows
        .into_iter()
        .next()
        .ok_or_else(|| HubError::EmptyResult(format!("insert into {table}")))?;

    info!(%board, post_id = created.id, user_id = %created.user_id, "post created");
    state.catalog.refresh(board.into());
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /forum
pub async fn create_forum_post(
    State(state): State<HubState>,
    session: AuthSession,
    Json(post): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), HubError> {
    create_post(&state, session, PostBoard::Forum, post).await
}

/// POST /feed
pub async fn create_feed_post(
    State(state): State<HubState>,
    session: AuthSession,
    Json(post): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), HubError> {
    create_post(&state, session, PostBoard::Feed, post).await
}

/// GET /forum/{id}/replies, oldest first. Read through, not cached.
pub async fn list_replies(
    State(state): State<HubState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Reply>>, HubError> {
    let query = Select::default()
        .eq("post_id", post_id)
        .order("created_at", Direction::Asc);
    let replies: Vec<Reply> = state.store.select(FORUM_REPLIES_TABLE, &query, None).await?;
    Ok(Json(replies))
}

/// POST /forum/{id}/replies
pub async fn create_reply(
    State(state): State<HubState>,
    Path(post_id): Path<i64>,
    session: AuthSession,
    Json(mut reply): Json<NewReply>,
) -> Result<(StatusCode, Json<Reply>), HubError> {
    check_content(&reply.content)?;
    reply.post_id = post_id;
    reply.user_id = session.user.id.clone();
    if reply.username.trim().is_empty() {
        reply.username = session.display_name();
    }

    let rows: Vec<Reply> = state
        .store
        .insert(FORUM_REPLIES_TABLE, &reply, Some(&session.access_token))
        .await?;
    let created = rows
        .into_iter()
        .next()
        .ok_or_else(|| HubError::EmptyResult(format!("insert into {FORUM_REPLIES_TABLE}")))?;

    info!(post_id, reply_id = created.id, "reply created");
    // Reply counters live on the post row.
    state.catalog.refresh(CollectionKind::Forum);
    Ok((StatusCode::CREATED, Json(created)))
}
