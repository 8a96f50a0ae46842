//! Job records and the kinds of job the backend can start.
//!
//! Jobs are opaque to the client: only `id` drives list membership and
//! delete reconciliation. `status` is kept as the backend's own string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of jobs fetched for the recent-jobs list.
pub const DEFAULT_JOB_FETCH_LIMIT: usize = 50;

/// Backend-assigned job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for JobId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// A backend-tracked analytical job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: String,
    pub params: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Job {
    /// `true` once the backend no longer reports the job as queued or running.
    pub fn is_finished(&self) -> bool {
        !matches!(self.status.as_str(), "queued" | "running")
    }
}

// ---------------------------------------------------------------------------
// Job kinds
// ---------------------------------------------------------------------------

/// Kinds of job that have a dedicated start endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Quant environment verification (no parameters).
    Verify,
    /// K-line (candle) data download into the local store.
    KlUpdate,
    /// Strategy backtest.
    Backtest,
    /// Parameter grid search with cross validation.
    GridSearch,
    /// Generic analysis tool run.
    Tool,
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        Self::Verify,
        Self::KlUpdate,
        Self::Backtest,
        Self::GridSearch,
        Self::Tool,
    ];

    /// The `type` string the backend stores on jobs of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::KlUpdate => "kl_update",
            Self::Backtest => "backtest",
            Self::GridSearch => "grid_search",
            Self::Tool => "analysis",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "verify" => Ok(Self::Verify),
            "kl_update" => Ok(Self::KlUpdate),
            "backtest" => Ok(Self::Backtest),
            "grid_search" => Ok(Self::GridSearch),
            "analysis" | "tool" | "tools" => Ok(Self::Tool),
            other => Err(format!("unknown job kind: {other}")),
        }
    }
}
