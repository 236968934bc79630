//! Application shell: owns the policy collection and mediates every change to it
//!
//! The collection is never patched locally. Each mutation is followed by a full
//! refetch and the backend's answer replaces what is held. The state lock is
//! never held across an API call, so pages keep rendering while one is
//! outstanding.

use crate::form::{Blocked, FormError, FormFields, PolicyForm};
use chrono::NaiveDate;
use policy_client::{ApiError, Policy, PolicyApi, PolicyId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load policies. Please try again.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete policy. Please try again.";
pub const STALE_SELECTION_MESSAGE: &str = "That policy is no longer available.";

#[derive(Debug, Clone, Default)]
pub struct ShellState {
    pub policies: Vec<Policy>,
    pub selected: Option<Policy>,
    pub loading: bool,
    pub error: Option<String>,
    pub mounted: bool,
    pub form: PolicyForm,
    // Ticket of the most recently issued fetch; only that fetch may land.
    latest_fetch: u64,
}

/// Result of a form submission
#[derive(Debug)]
pub enum SubmitOutcome {
    Saved(Policy),
    Rejected(FormError),
    InFlight,
    Failed(ApiError),
}

#[derive(Clone)]
pub struct Shell {
    api: Arc<dyn PolicyApi>,
    state: Arc<Mutex<ShellState>>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl Shell {
    pub fn new(api: Arc<dyn PolicyApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ShellState::default())),
            today: local_today,
        }
    }

    /// Replace the source of "today" used for date defaults.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn snapshot(&self) -> ShellState {
        self.state.lock().await.clone()
    }

    /// Initial fetch. Only the first call does anything.
    pub async fn mount(&self) {
        {
            let mut state = self.state.lock().await;
            if state.mounted {
                return;
            }
            state.mounted = true;
        }
        info!("Mounting policy shell");
        self.refetch().await;
    }

    /// Reload the whole collection from the backend.
    ///
    /// Returns `true` when this fetch replaced the collection. A fetch that
    /// completes after a newer one was issued is dropped.
    pub async fn refetch(&self) -> bool {
        let ticket = {
            let mut state = self.state.lock().await;
            state.latest_fetch += 1;
            state.loading = true;
            state.latest_fetch
        };

        let result = self.api.list().await;

        let mut state = self.state.lock().await;
        if ticket != state.latest_fetch {
            debug!(
                ticket,
                latest = state.latest_fetch,
                "Dropping stale policy fetch"
            );
            return false;
        }
        state.loading = false;

        match result {
            Ok(policies) => {
                info!(count = policies.len(), "Loaded policies");
                state.policies = policies;
                state.error = None;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to load policies");
                state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Find the held record whose id reads as `key`, e.g. a URL path segment.
    ///
    /// Sets the error slot when nothing matches.
    pub async fn resolve(&self, key: &str) -> Option<PolicyId> {
        let mut state = self.state.lock().await;
        let found = state
            .policies
            .iter()
            .find(|p| p.id.matches_key(key))
            .map(|p| p.id.clone());
        if found.is_none() {
            warn!(policy_key = %key, "No held policy matches key");
            state.error = Some(STALE_SELECTION_MESSAGE.to_string());
        }
        found
    }

    /// Put the record with `id` into the form for editing.
    pub async fn select_for_edit(&self, id: &PolicyId) -> bool {
        let mut state = self.state.lock().await;
        let Some(policy) = state.policies.iter().find(|p| &p.id == id).cloned() else {
            warn!(policy_id = %id, "Edit requested for unknown policy");
            state.error = Some(STALE_SELECTION_MESSAGE.to_string());
            return false;
        };

        debug!(policy_id = %id, "Selected policy for edit");
        state.form.load(Some(&policy));
        state.selected = Some(policy);
        true
    }

    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        state.selected = None;
        state.form.load(None);
    }

    /// Submit the form: validate, create or update, then reload.
    pub async fn submit(&self, fields: FormFields) -> SubmitOutcome {
        let submission = {
            let mut state = self.state.lock().await;
            match state.form.begin_submit(fields, (self.today)()) {
                Ok(submission) => submission,
                Err(Blocked::InFlight) => {
                    warn!("Ignoring policy submission while another is in flight");
                    return SubmitOutcome::InFlight;
                }
                Err(Blocked::Invalid(e)) => {
                    debug!(reason = %e, "Policy submission rejected");
                    return SubmitOutcome::Rejected(e);
                }
            }
        };

        let result = submission.dispatch(self.api.as_ref()).await;

        {
            let mut state = self.state.lock().await;
            state.form.finish_submit(&result);
            if result.is_ok() {
                state.selected = None;
                state.form.load(None);
            }
        }

        match result {
            Ok(policy) => {
                info!(policy_id = %policy.id, "Saved policy");
                self.refetch().await;
                SubmitOutcome::Saved(policy)
            }
            Err(e) => {
                error!(error = %e, "Error submitting policy");
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Delete the record with `id`, then reload. On failure the row stays.
    pub async fn delete(&self, id: &PolicyId) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                info!(policy_id = %id, "Deleted policy");
                {
                    let mut state = self.state.lock().await;
                    if state.selected.as_ref().is_some_and(|p| &p.id == id) {
                        state.selected = None;
                        state.form.load(None);
                    }
                }
                self.refetch().await;
                true
            }
            Err(e) => {
                error!(policy_id = %id, error = %e, "Failed to delete policy");
                self.state.lock().await.error = Some(DELETE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    pub async fn dismiss_error(&self) {
        self.state.lock().await.error = None;
    }
}
