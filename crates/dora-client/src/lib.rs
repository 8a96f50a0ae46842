//! # dora-client
//!
//! HTTP client adapter for the Doraemon quant backend.
//!
//! The [`Transport`] trait is the seam between the stores and the network: it
//! sends one [`ApiRequest`] and either returns the decoded JSON body or a
//! normalized [`ApiError`]. [`HttpTransport`] is the reqwest implementation;
//! tests substitute scripted transports.
//!
//! [`QuantApi`] and [`TaskApi`] wrap a transport with typed endpoint calls and
//! unwrap the `{message, data}` envelope.
//!
//! ## Endpoints
//!
//! | Operation         | Method | Path                              |
//! |-------------------|--------|-----------------------------------|
//! | Symbol search     | GET    | `/quant/symbols`                  |
//! | Symbol lookup     | GET    | `/quant/symbols/{symbol}`         |
//! | Symbol import     | POST   | `/quant/symbols/import`           |
//! | Feature map       | GET    | `/quant/features`                 |
//! | Verify env        | GET    | `/quant/verify`                   |
//! | K-line update     | POST   | `/quant/kl/update`                |
//! | Backtest          | POST   | `/quant/backtest`                 |
//! | Grid search       | POST   | `/quant/grid-search`              |
//! | Analysis tool     | POST   | `/quant/tools`                    |
//! | List / create job | GET/POST | `/jobs/`                        |
//! | Get / delete job  | GET/DELETE | `/jobs/{id}`                  |
//! | Export job result | GET    | `/jobs/{id}/export`               |
//! | Tasks             | GET/POST/PUT/DELETE | `/tasks/…`           |
//! | Health            | GET    | `/health` (outside the API prefix)|

pub mod http;
pub mod quant;
pub mod tasks;

use std::fmt;

use async_trait::async_trait;
use dora_core::ApiError;
use serde_json::Value;

pub use http::HttpTransport;
pub use quant::{ExportFormat, QuantApi};
pub use tasks::TaskApi;

/// HTTP verb of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// One backend call, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API root, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// `false` for routes mounted outside the versioned API prefix.
    pub versioned: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            versioned: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn unversioned(mut self) -> Self {
        self.versioned = false;
        self
    }
}

/// Transport used by the typed APIs and, through them, the stores.
///
/// Implementations must map every non-2xx status and every network failure
/// to a single [`ApiError`] carrying the normalized message.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and decode the JSON body. An empty body yields `Value::Null`.
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;

    /// Send a request and return the body text untouched.
    async fn send_text(&self, request: ApiRequest) -> Result<String, ApiError>;
}
