use reqwest::header::CONTENT_TYPE;
use tracing::info;
use url::Url;

use super::client::{StoreClient, check};
use crate::error::HubError;

impl StoreClient {
    /// Upload `bytes` to `<bucket>/<object_path>` (overwriting) and return the public URL.
    pub async fn upload(
        &self,
        bucket: &str,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        access_token: &str,
    ) -> Result<Url, HubError> {
        let segments = object_segments(bucket, object_path);
        let mut upload_path = vec!["storage", "v1", "object"];
        upload_path.extend(segments.iter().copied());

        let size = bytes.len();
        let url = self.endpoint(&upload_path)?;
        let resp = self
            .authorized(self.http().post(url), Some(access_token))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        check(resp).await?;

        let public = self.public_url(bucket, object_path)?;
        info!(bucket, object = object_path, size, "object uploaded");
        Ok(public)
    }

    /// Public URL of an object; no request is made.
    pub fn public_url(&self, bucket: &str, object_path: &str) -> Result<Url, HubError> {
        let segments = object_segments(bucket, object_path);
        let mut path = vec!["storage", "v1", "object", "public"];
        path.extend(segments.iter().copied());
        self.endpoint(&path)
    }
}

fn object_segments<'a>(bucket: &'a str, object_path: &'a str) -> Vec<&'a str> {
    std::iter::once(bucket)
        .chain(object_path.split('/').filter(|s| !s.is_empty()))
        .collect()
}
