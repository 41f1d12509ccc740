use reqwest::header::{ACCEPT, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::query::Select;
use crate::config::Config;
use crate::error::{HubError, StoreErrorBody};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Client for the hosted backend. Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base: Url,
    anon_key: Arc<str>,
}

impl StoreClient {
    /// Build the client with timeouts and optional proxy from `cfg`.
    pub fn new(cfg: &Config) -> Result<Self, HubError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("wellness-hub/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(cfg.request_timeout());
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base: cfg.supabase_url.clone(),
            anon_key: Arc::from(cfg.supabase_anon_key.as_str()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /rest/v1/<table>` with the pushed-down query.
    pub async fn select<T>(
        &self,
        table: &str,
        query: &Select,
        token: Option<&str>,
    ) -> Result<Vec<T>, HubError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(&["rest", "v1", table])?;
        let resp = self
            .authorized(self.http.get(url), token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .query(&query.to_query())
            .send()
            .await?;
        let rows: Vec<T> = read_json(check(resp).await?).await?;
        debug!(table, rows = rows.len(), "select completed");
        Ok(rows)
    }

    /// `POST /rest/v1/<table>`; returns the inserted rows.
    pub async fn insert<B, T>(
        &self,
        table: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Vec<T>, HubError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&["rest", "v1", table])?;
        let resp = self
            .authorized(self.http.post(url), token)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = read_json(check(resp).await?).await?;
        debug!(table, rows = rows.len(), "insert completed");
        Ok(rows)
    }

    /// `PATCH /rest/v1/<table>` restricted by the filters in `filter`; returns the updated rows.
    pub async fn update<B, T>(
        &self,
        table: &str,
        filter: &Select,
        body: &B,
        token: Option<&str>,
    ) -> Result<Vec<T>, HubError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&["rest", "v1", table])?;
        let resp = self
            .authorized(self.http.patch(url), token)
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&filter.to_query())
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = read_json(check(resp).await?).await?;
        debug!(table, rows = rows.len(), "update completed");
        Ok(rows)
    }

    /// `DELETE /rest/v1/<table>` restricted by the filters in `filter`.
    pub async fn delete(
        &self,
        table: &str,
        filter: &Select,
        token: Option<&str>,
    ) -> Result<(), HubError> {
        let url = self.endpoint(&["rest", "v1", table])?;
        let resp = self
            .authorized(self.http.delete(url), token)
            .query(&filter.to_filter_query())
            .send()
            .await?;
        check(resp).await?;
        debug!(table, "delete completed");
        Ok(())
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Attach the project key and the caller's token (anon key when there is no session).
    pub(super) fn authorized(
        &self,
        req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        req.header("apikey", self.anon_key.as_ref())
            .bearer_auth(token.unwrap_or(self.anon_key.as_ref()))
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, HubError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Pass non-2xx responses through as the backend's own error object.
pub(super) async fn check(resp: reqwest::Response) -> Result<reqwest::Response, HubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let bytes = resp.bytes().await?;
    let body = StoreErrorBody::from_bytes(&bytes);
    warn!(%status, message = %body.message, code = ?body.code, "remote store rejected request");
    Err(HubError::Store { status, body })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, HubError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
