//! Quant store: symbol search with pagination and job orchestration.
//!
//! # State
//!
//! ```text
//! QuantState
//! ├── filter + symbols + total      (symbols_status)
//! ├── jobs                          (jobs_status)
//! └── active_job                    (active_job_status)
//! ```
//!
//! Each aggregate has its own [`LoadState`]; a failure in one never touches
//! another. Starting a job always re-fetches the job list instead of
//! appending locally, so ordering and status stay whatever the backend says.

use std::time::Duration;

use dora_client::{ExportFormat, QuantApi};
use dora_core::config::StoreConfig;
use dora_core::{ApiError, FilterUpdate, Job, JobId, JobKind, PageResult, SearchFilter, SymbolRecord};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::status::{LoadState, Slot, bare_call, isolated_call};

/// Snapshot of everything the quant store tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantState {
    /// Filter of the latest refresh, with the server's pagination adopted.
    pub filter: SearchFilter,
    /// Symbols of the current page, in backend order.
    pub symbols: Vec<SymbolRecord>,
    /// Total matches across all pages.
    pub total: u64,
    pub symbols_status: LoadState,

    /// Recent jobs, newest first.
    pub jobs: Vec<Job>,
    pub jobs_status: LoadState,

    /// Job most recently started or fetched.
    pub active_job: Option<Job>,
    /// Loading flag of `fetch_job`. Its failures propagate to the caller,
    /// so `error` here stays `None`.
    pub active_job_status: LoadState,
}

impl QuantState {
    fn symbols_slot(&mut self) -> &mut LoadState {
        &mut self.symbols_status
    }

    fn jobs_slot(&mut self) -> &mut LoadState {
        &mut self.jobs_status
    }

    fn active_job_slot(&mut self) -> &mut LoadState {
        &mut self.active_job_status
    }
}

/// State and actions for symbol search and analytical jobs.
///
/// All actions take `&self`; wrap the store in an `Arc` to drive it from
/// several tasks. Concurrent calls to the same action are not serialized:
/// the response that lands last wins.
pub struct QuantStore {
    api: QuantApi,
    state: watch::Sender<QuantState>,
    job_fetch_limit: usize,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl QuantStore {
    /// Create a store seeded from the `store` config section.
    pub fn new(api: QuantApi, config: &StoreConfig) -> Self {
        let filter = SearchFilter {
            market: config.default_market.clone(),
            page_size: config.default_page_size.max(1),
            ..SearchFilter::default()
        };
        let (state, _) = watch::channel(QuantState {
            filter,
            ..QuantState::default()
        });
        Self {
            api,
            state,
            job_fetch_limit: config.job_fetch_limit,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> QuantState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<QuantState> {
        self.state.subscribe()
    }

    pub fn job_fetch_limit(&self) -> usize {
        self.job_fetch_limit
    }

    // -----------------------------------------------------------------------
    // Symbols
    // -----------------------------------------------------------------------

    /// Merge `update` into the filter and load that page.
    ///
    /// The merged filter is committed before the request so it reflects the
    /// caller's intent even when the request fails. On failure the previous
    /// page stays readable and `symbols_status.error` holds the message.
    pub async fn refresh(&self, update: FilterUpdate) {
        let mut filter = SearchFilter::default();
        self.state.send_modify(|s| {
            s.filter = update.apply(&s.filter);
            filter = s.filter.clone();
        });
        debug!(
            "[quant-store] refresh market={} q={:?} kind={} page={} size={}",
            filter.market, filter.query, filter.kind, filter.page, filter.page_size
        );

        isolated_call(
            &self.state,
            QuantState::symbols_slot,
            "symbol search",
            self.api.search_symbols(&filter),
            |s, page: &PageResult| {
                s.symbols = page.items.clone();
                s.total = page.total;
                s.filter.adopt_served(page);
            },
        )
        .await;
    }

    /// Trigger a backend-side import of a market's symbol table.
    ///
    /// Returns the backend's result payload, or `None` with
    /// `symbols_status.error` set. The current page is left untouched.
    pub async fn import_symbols(&self, market: &str) -> Option<Value> {
        let result = isolated_call(
            &self.state,
            QuantState::symbols_slot,
            "symbol import",
            self.api.import_symbols(market),
            |_, _| {},
        )
        .await;
        if let Some(ref payload) = result {
            info!("[quant-store] symbols imported for {market}: {payload}");
        }
        result
    }

    /// Look up a single symbol. Does not touch store state.
    pub async fn lookup_symbol(&self, symbol: &str, market: &str) -> Result<SymbolRecord, ApiError> {
        self.api.get_symbol(symbol, market).await
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    /// Replace the job list with the backend's newest `limit` jobs.
    ///
    /// Failures are recorded in `jobs_status.error`; the previous list stays.
    pub async fn fetch_jobs(&self, limit: usize) {
        isolated_call(
            &self.state,
            QuantState::jobs_slot,
            "job list",
            self.api.list_jobs(limit),
            |s, jobs: &Vec<Job>| {
                s.jobs = jobs.iter().take(limit).cloned().collect();
            },
        )
        .await;
    }

    /// [`fetch_jobs`](Self::fetch_jobs) with the configured limit.
    pub async fn refresh_jobs(&self) {
        self.fetch_jobs(self.job_fetch_limit).await;
    }

    /// Load one job into `active_job`. Failures propagate.
    pub async fn fetch_job(&self, id: JobId) -> Result<Job, ApiError> {
        bare_call(
            &self.state,
            Some(QuantState::active_job_slot as Slot<QuantState>),
            self.api.get_job(id),
            |s, job: &Job| s.active_job = Some(job.clone()),
        )
        .await
    }

    /// Start a job of `kind`.
    ///
    /// On success the new job becomes `active_job` and the job list is
    /// re-fetched once. Failures propagate before any state changes.
    pub async fn start_job(&self, kind: JobKind, params: Value) -> Result<Job, ApiError> {
        let job = bare_call(
            &self.state,
            None,
            self.api.start_job(kind, &params),
            |s: &mut QuantState, job: &Job| s.active_job = Some(job.clone()),
        )
        .await?;
        info!("[quant-store] {kind} job {} started ({})", job.id, job.status);

        self.refresh_jobs().await;
        Ok(job)
    }

    pub async fn start_verify(&self) -> Result<Job, ApiError> {
        self.start_job(JobKind::Verify, Value::Null).await
    }

    pub async fn start_kl_update(&self, params: Value) -> Result<Job, ApiError> {
        self.start_job(JobKind::KlUpdate, params).await
    }

    pub async fn start_backtest(&self, params: Value) -> Result<Job, ApiError> {
        self.start_job(JobKind::Backtest, params).await
    }

    pub async fn start_grid_search(&self, params: Value) -> Result<Job, ApiError> {
        self.start_job(JobKind::GridSearch, params).await
    }

    pub async fn start_tool(&self, params: Value) -> Result<Job, ApiError> {
        self.start_job(JobKind::Tool, params).await
    }

    /// Create a job of any backend type through the generic jobs route.
    ///
    /// Same contract as [`start_job`](Self::start_job).
    pub async fn create_job(&self, job_type: &str, params: Value) -> Result<Job, ApiError> {
        let job = bare_call(
            &self.state,
            None,
            self.api.create_job(job_type, &params),
            |s: &mut QuantState, job: &Job| s.active_job = Some(job.clone()),
        )
        .await?;
        info!("[quant-store] {job_type} job {} created ({})", job.id, job.status);

        self.refresh_jobs().await;
        Ok(job)
    }

    /// Delete a job and reconcile local state.
    ///
    /// The job is filtered out of the list (remaining order kept) and
    /// `active_job` is cleared if it was the deleted one.
    pub async fn delete_job(&self, id: JobId) -> Result<(), ApiError> {
        bare_call(
            &self.state,
            None,
            self.api.delete_job(id),
            |s: &mut QuantState, _: &()| {
                s.jobs.retain(|job| job.id != id);
                if s.active_job.as_ref().is_some_and(|job| job.id == id) {
                    s.active_job = None;
                }
            },
        )
        .await?;
        info!("[quant-store] job {id} deleted");
        Ok(())
    }

    /// Poll a job with the configured interval and timeout until it finishes.
    pub async fn wait_for_job(&self, id: JobId) -> Result<Job, ApiError> {
        self.wait_for_job_with(id, self.poll_interval, self.wait_timeout)
            .await
    }

    /// Poll a job every `interval` until the backend reports it finished.
    ///
    /// Each poll goes through [`fetch_job`](Self::fetch_job), so `active_job`
    /// tracks the latest status. Poll failures propagate.
    pub async fn wait_for_job_with(
        &self,
        id: JobId,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Job, ApiError> {
        // An unrepresentable deadline means no deadline.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let job = self.fetch_job(id).await?;
            if job.is_finished() {
                info!("[quant-store] job {id} finished: {}", job.status);
                return Ok(job);
            }
            let out_of_time = deadline.is_some_and(|deadline| {
                Instant::now()
                    .checked_add(interval)
                    .is_none_or(|next| next > deadline)
            });
            if out_of_time {
                return Err(ApiError::Timeout(format!(
                    "job {id} still {} after {:?}",
                    job.status, timeout
                )));
            }
            debug!("[quant-store] job {id} is {}, polling again", job.status);
            tokio::time::sleep(interval).await;
        }
    }

    /// Export a job result as JSON or CSV text.
    pub async fn export_job(
        &self,
        id: JobId,
        format: ExportFormat,
        section: Option<&str>,
    ) -> Result<String, ApiError> {
        self.api.export_job(id, format, section).await
    }

    /// Feature map advertised by the backend.
    pub async fn features(&self) -> Result<Value, ApiError> {
        self.api.features().await
    }

    /// Backend liveness probe.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.api.health().await
    }
}
