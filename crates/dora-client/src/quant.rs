//! Typed calls for the `/quant` and `/jobs` routes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dora_core::envelope;
use dora_core::{ApiError, Job, JobId, JobKind, PageResult, SearchFilter, SymbolRecord};
use serde_json::{Value, json};

use crate::{ApiRequest, Transport};

/// Output format of a job export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Quant backend API over an arbitrary [`Transport`].
#[derive(Clone)]
pub struct QuantApi {
    transport: Arc<dyn Transport>,
}

impl QuantApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // -----------------------------------------------------------------------
    // Symbols
    // -----------------------------------------------------------------------

    /// Search symbols with the full filter.
    pub async fn search_symbols(&self, filter: &SearchFilter) -> Result<PageResult, ApiError> {
        let mut req = ApiRequest::get("/quant/symbols");
        for (key, value) in filter.query_params() {
            req = req.query(key, value);
        }
        envelope::object(self.transport.send(req).await?)
    }

    /// Look up one symbol within a market scope.
    pub async fn get_symbol(&self, symbol: &str, market: &str) -> Result<SymbolRecord, ApiError> {
        let path = format!("/quant/symbols/{}", urlencoding::encode(symbol.trim()));
        let req = ApiRequest::get(path).query("market", market);
        envelope::object(self.transport.send(req).await?)
    }

    /// Ask the backend to (re)import the symbol table of a market.
    pub async fn import_symbols(&self, market: &str) -> Result<Value, ApiError> {
        let req = ApiRequest::post("/quant/symbols/import", json!({ "market": market }));
        Ok(envelope::object_value(self.transport.send(req).await?))
    }

    /// Feature map and rollout plan advertised by the backend.
    pub async fn features(&self) -> Result<Value, ApiError> {
        let req = ApiRequest::get("/quant/features");
        Ok(envelope::object_value(self.transport.send(req).await?))
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    /// Start a job through its dedicated endpoint.
    ///
    /// Verification is triggered by a GET and takes no parameters; every
    /// other kind posts `params` (an empty object when `Null`).
    pub async fn start_job(&self, kind: JobKind, params: &Value) -> Result<Job, ApiError> {
        let body = if params.is_null() { json!({}) } else { params.clone() };
        let req = match kind {
            JobKind::Verify => ApiRequest::get("/quant/verify"),
            JobKind::KlUpdate => ApiRequest::post("/quant/kl/update", body),
            JobKind::Backtest => ApiRequest::post("/quant/backtest", body),
            JobKind::GridSearch => ApiRequest::post("/quant/grid-search", body),
            JobKind::Tool => ApiRequest::post("/quant/tools", body),
        };
        envelope::object(self.transport.send(req).await?)
    }

    /// Create a job of any backend-known type.
    pub async fn create_job(&self, job_type: &str, params: &Value) -> Result<Job, ApiError> {
        let params = if params.is_null() { json!({}) } else { params.clone() };
        let req = ApiRequest::post("/jobs/", json!({ "type": job_type, "params": params }));
        envelope::object(self.transport.send(req).await?)
    }

    /// Most recent jobs, newest first.
    pub async fn list_jobs(&self, limit: usize) -> Result<Vec<Job>, ApiError> {
        let req = ApiRequest::get("/jobs/").query("limit", limit);
        envelope::list(self.transport.send(req).await?)
    }

    pub async fn get_job(&self, id: JobId) -> Result<Job, ApiError> {
        let req = ApiRequest::get(format!("/jobs/{id}"));
        envelope::object(self.transport.send(req).await?)
    }

    /// Delete a job. The backend refuses running jobs with 409.
    pub async fn delete_job(&self, id: JobId) -> Result<(), ApiError> {
        let req = ApiRequest::delete(format!("/jobs/{id}"));
        self.transport.send(req).await?;
        Ok(())
    }

    /// Export a finished job's result, optionally narrowed to one section.
    pub async fn export_job(
        &self,
        id: JobId,
        format: ExportFormat,
        section: Option<&str>,
    ) -> Result<String, ApiError> {
        let mut req = ApiRequest::get(format!("/jobs/{id}/export")).query("format", format);
        if let Some(section) = section {
            req = req.query("section", section);
        }
        self.transport.send_text(req).await
    }

    /// Service liveness probe.
    pub async fn health(&self) -> Result<Value, ApiError> {
        let req = ApiRequest::get("/health").unversioned();
        Ok(envelope::object_value(self.transport.send(req).await?))
    }
}
