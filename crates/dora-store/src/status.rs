//! The shared loading/error protocol.
//!
//! Two call disciplines wrap every store action:
//!
//! - [`isolated_call`] clears the aggregate's error, and on failure records
//!   the normalized message and resolves to `None`.
//! - [`bare_call`] lets the failure propagate and never writes the error.
//!
//! Both hold a [`LoadingGuard`] for the duration of the backend call, so the
//! loading flag is released on success, on failure and when the action
//! future is dropped mid-flight.

use std::future::Future;

use dora_core::ApiError;
use tokio::sync::watch;
use tracing::warn;

/// Loading flag and last error of one aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Projection from a store's state to one aggregate's [`LoadState`].
pub(crate) type Slot<S> = fn(&mut S) -> &mut LoadState;

/// Sets `loading` on creation and clears it on drop.
pub(crate) struct LoadingGuard<'a, S> {
    state: &'a watch::Sender<S>,
    slot: Slot<S>,
}

impl<'a, S> LoadingGuard<'a, S> {
    pub(crate) fn begin(state: &'a watch::Sender<S>, slot: Slot<S>, clear_error: bool) -> Self {
        state.send_modify(|s| {
            let status = slot(s);
            status.loading = true;
            if clear_error {
                status.error = None;
            }
        });
        Self { state, slot }
    }
}

impl<S> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let slot = self.slot;
        self.state.send_modify(|s| slot(s).loading = false);
    }
}

/// Run `call` under the slot's loading flag, committing on success and
/// recording the error message on failure.
pub(crate) async fn isolated_call<S, T, F, C>(
    state: &watch::Sender<S>,
    slot: Slot<S>,
    label: &str,
    call: F,
    commit: C,
) -> Option<T>
where
    F: Future<Output = Result<T, ApiError>>,
    C: FnOnce(&mut S, &T),
{
    let _busy = LoadingGuard::begin(state, slot, true);
    match call.await {
        Ok(value) => {
            state.send_modify(|s| commit(s, &value));
            Some(value)
        }
        Err(err) => {
            warn!("[store] {label} failed: {err}");
            let message = err.to_string();
            state.send_modify(|s| slot(s).error = Some(message));
            None
        }
    }
}

/// Run `call`, committing on success and returning the error untouched.
///
/// `slot` is the loading flag to hold, if the action has one.
pub(crate) async fn bare_call<S, T, F, C>(
    state: &watch::Sender<S>,
    slot: Option<Slot<S>>,
    call: F,
    commit: C,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
    C: FnOnce(&mut S, &T),
{
    let _busy = slot.map(|slot| LoadingGuard::begin(state, slot, false));
    let value = call.await?;
    state.send_modify(|s| commit(s, &value));
    Ok(value)
}
