// SPDX-License-Identifier: MIT
//! HTTP gateway to the task-management backend.
//!
//! One [`ApiClient`] is built at startup and shared by every screen. The
//! client holds no session state; each authenticated call takes the
//! access token explicitly, so a token refresh swaps credentials without
//! touching the client.

mod auth;
mod tasks;
mod users;

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{classify, ApiError};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given API root, e.g. `http://host:8000/api`.
    /// A trailing slash on the root is tolerated.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(token)
    }

    fn post(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(token)
    }

    fn put(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(token)
    }

    fn patch(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.patch(self.url(path)).bearer_auth(token)
    }

    fn delete(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(token)
    }

    /// Send a request and decode the success body. Non-success responses
    /// are classified by status and body shape into an [`ApiError`].
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            debug!(%status, "api request failed");
            return Err(classify(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request whose response body is irrelevant (DELETE, logout).
    async fn send_no_body(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            debug!(%status, "api request failed");
            return Err(classify(status, &body));
        }
        Ok(())
    }
}
