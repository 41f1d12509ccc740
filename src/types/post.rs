use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_as_default;

/// The two post collections. Both share one row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostBoard {
    Forum,
    Feed,
}

impl PostBoard {
    pub fn as_str(self) -> &'static str {
        match self {
            PostBoard::Forum => "forum",
            PostBoard::Feed => "feed",
        }
    }
}

impl fmt::Display for PostBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    #[serde(alias = "useruid", alias = "userUID")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u32,
    #[serde(default, alias = "comments", deserialize_with = "null_as_default")]
    pub replies: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub id: i64,
    pub post_id: i64,
    #[serde(alias = "useruid", alias = "userUID")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u32,
}

/// Insert payload for a new post. Id, timestamp and counters are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub content: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReply {
    #[serde(default)]
    pub post_id: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub content: String,
}
