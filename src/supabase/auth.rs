use reqwest::StatusCode;
use tracing::debug;

use super::client::{StoreClient, check};
use crate::error::HubError;
use crate::types::AuthUser;

impl StoreClient {
    /// Resolve an access token to its session user via `GET /auth/v1/user`.
    ///
    /// Any 401/403 from the auth service is reported as [`HubError::Unauthorized`];
    /// other failures pass through unchanged.
    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, HubError> {
        let url = self.endpoint(&["auth", "v1", "user"])?;
        let resp = self
            .authorized(self.http().get(url), Some(access_token))
            .send()
            .await?;

        let resp = match check(resp).await {
            Ok(resp) => resp,
            Err(HubError::Store { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                return Err(HubError::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        let bytes = resp.bytes().await?;
        let user: AuthUser = serde_json::from_slice(&bytes)?;
        debug!(user_id = %user.id, "session resolved");
        Ok(user)
    }
}
