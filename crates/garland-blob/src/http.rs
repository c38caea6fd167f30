//! Remote object-store gateway backend.
//!
//! Speaks a minimal JSON/HTTP bucket API:
//!
//! - `PUT  {base}/o/{key}` — store a blob (body = bytes)
//! - `GET  {base}/o/{key}` — fetch a blob
//! - `GET  {base}/list?prefix={p}` — JSON array of matching keys
//! - `POST {base}/copy` — `{"src": .., "dst": ..}` server-side copy
//!
//! A 404 maps to [`BlobError::NotFound`]; transport errors and non-2xx
//! statuses map to [`BlobError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// Configuration for the remote gateway backend.
#[derive(Clone, Debug)]
pub struct HttpBlobConfig {
    /// Gateway base URL, e.g. `https://store.example.com/garland`.
    pub endpoint: String,
    /// Optional bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Overall per-request timeout.
    pub timeout: Duration,
}

impl HttpBlobConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blob store backed by a remote object-store gateway.
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpBlobStore {
    /// Build a store from the given configuration.
    pub fn new(config: HttpBlobConfig) -> BlobResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BlobError::unavailable)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth_token: config.auth_token,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/o/{key}", self.endpoint)
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Map a non-success response to the blob error taxonomy.
    fn status_error(key: &str, status: StatusCode) -> BlobError {
        if status == StatusCode::NOT_FOUND {
            BlobError::not_found(key)
        } else {
            BlobError::unavailable(format!("gateway returned {status}"))
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> BlobResult<()> {
        let req = self
            .client
            .put(self.object_url(key))
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let resp = self
            .with_auth(req)
            .send()
            .await
            .map_err(BlobError::unavailable)?;
        if !resp.status().is_success() {
            return Err(Self::status_error(key, resp.status()));
        }
        debug!(key, "blob uploaded");
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let req = self.client.get(self.object_url(key));
        let resp = self
            .with_auth(req)
            .send()
            .await
            .map_err(BlobError::unavailable)?;
        if !resp.status().is_success() {
            return Err(Self::status_error(key, resp.status()));
        }
        resp.bytes().await.map_err(BlobError::unavailable)
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let req = self
            .client
            .get(format!("{}/list", self.endpoint))
            .query(&[("prefix", prefix)]);
        let resp = self
            .with_auth(req)
            .send()
            .await
            .map_err(BlobError::unavailable)?;
        if !resp.status().is_success() {
            return Err(BlobError::unavailable(format!(
                "gateway list returned {}",
                resp.status()
            )));
        }
        resp.json::<Vec<String>>()
            .await
            .map_err(BlobError::unavailable)
    }

    async fn copy(&self, src: &str, dst: &str) -> BlobResult<()> {
        let req = self
            .client
            .post(format!("{}/copy", self.endpoint))
            .json(&json!({ "src": src, "dst": dst }));
        let resp = self
            .with_auth(req)
            .send()
            .await
            .map_err(BlobError::unavailable)?;
        if !resp.status().is_success() {
            return Err(Self::status_error(src, resp.status()));
        }
        debug!(src, dst, "blob copied");
        Ok(())
    }
}
