use serde::{Deserialize, Serialize};

/// Session user as returned by the auth service. Everything besides `id` and
/// `email` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
