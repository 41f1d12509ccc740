//! Bundled JSON stand-ins for the forum and feed tables.
//!
//! A fixtures directory holds `forum.json` and/or `feed.json`, each either a
//! bare array of posts or an envelope `{ "posts": [...] }`.

use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::error::HubError;
use crate::types::{Post, PostBoard};

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<Post>,
}

/// Load the fixture file for `board`. A missing directory or file yields no posts.
pub async fn load_board(dir: &Path, board: PostBoard) -> Result<Vec<Post>, HubError> {
    if !fs::try_exists(dir).await.unwrap_or(false) {
        info!(path = %dir.display(), "fixtures directory not found; skipping load");
        return Ok(Vec::new());
    }

    let path = dir.join(format!("{board}.json"));
    if !is_json_file(&path).await {
        info!(path = %path.display(), %board, "no fixture file for board");
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(&path).await?;
    let posts = parse_posts(&contents).inspect_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to parse fixture file");
    })?;
    info!(path = %path.display(), %board, count = posts.len(), "fixture posts loaded");
    Ok(posts)
}

/// Parse either the envelope or a bare array.
pub fn parse_posts(payload: &str) -> Result<Vec<Post>, HubError> {
    match serde_json::from_str::<PostsEnvelope>(payload) {
        Ok(envelope) => Ok(envelope.posts),
        Err(_) => Ok(serde_json::from_str::<Vec<Post>>(payload)?),
    }
}

async fn is_json_file(path: &Path) -> bool {
    let has_json_ext = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    has_json_ext && fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
