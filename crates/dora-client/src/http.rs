//! reqwest-backed [`Transport`].
//!
//! Every request carries `Content-Type: application/json` and a fresh
//! `X-Request-Id` so backend logs can be correlated with ours. Error bodies
//! are normalized through [`ApiError::from_status`].

use std::time::Duration;

use async_trait::async_trait;
use dora_core::ApiError;
use dora_core::config::ApiConfig;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{ApiRequest, Method, Transport};

/// HTTP transport over a shared `reqwest::Client`.
pub struct HttpTransport {
    http: reqwest::Client,
    /// Scheme + host + port, e.g. `http://127.0.0.1:8000`.
    base_url: String,
    /// `base_url` joined with the API prefix.
    api_root: String,
}

impl HttpTransport {
    /// Build a transport from the `api` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Transport(format!("building HTTP client failed: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_root: config.api_root(),
        })
    }

    /// Absolute URL for a request.
    pub fn url(&self, request: &ApiRequest) -> String {
        let root = if request.versioned {
            &self.api_root
        } else {
            &self.base_url
        };
        format!("{root}{}", request.path)
    }

    /// Issue the request and return the body of a 2xx response.
    async fn execute(&self, request: ApiRequest) -> Result<String, ApiError> {
        let url = self.url(&request);
        let request_id = Uuid::new_v4().to_string();
        debug!("[http] {} {} id={request_id}", request.method, url);

        let mut builder = self
            .http
            .request(reqwest_method(request.method), &url)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Request-Id", &request_id);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            warn!("[http] {} {} failed: {e}", request.method, url);
            ApiError::Transport(e.to_string())
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &text);
            warn!("[http] {} {} → {}: {err}", request.method, url, status.as_u16());
            return Err(err);
        }

        debug!("[http] {} {} → {} ({} bytes)", request.method, url, status.as_u16(), text.len());
        Ok(text)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let text = self.execute(request).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_text(&self, request: ApiRequest) -> Result<String, ApiError> {
        self.execute(request).await
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}
