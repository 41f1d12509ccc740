use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::debug;

use crate::error::HubError;
use crate::router::HubState;
use crate::types::AuthUser;

/// Session resolved from `Authorization: Bearer <access token>`.
///
/// The token is handed to the auth service as is; the session user is an opaque
/// external collaborator and only `id`/`email` are read from it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
}

impl AuthSession {
    /// Display name used when a post does not carry one.
    pub fn display_name(&self) -> String {
        self.user
            .email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("anonymous")
            .to_string()
    }
}

impl FromRequestParts<HubState> for AuthSession {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HubState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| HubError::Unauthorized)?;

        let token = bearer.token().trim();
        if token.is_empty() {
            return Err(HubError::Unauthorized);
        }

        let user = state.store.current_user(token).await?;
        debug!(user_id = %user.id, "request authenticated");
        Ok(Self {
            user,
            access_token: token.to_string(),
        })
    }
}
