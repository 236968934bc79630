use crate::form::FormFields;
use crate::list::{self, RowActions};
use crate::shell::{ShellState, SubmitOutcome};
use crate::{AppError, AppResult, AppState};

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use policy_client::{Policy, PolicyId};
use tracing::{debug, error, info};

/// Row actions that post back to this server
pub struct FormPostActions;

impl RowActions for FormPostActions {
    fn edit_action(&self, id: &PolicyId) -> String {
        format!("/policies/{}/edit", urlencoding::encode(&id.to_string()))
    }

    fn delete_action(&self, id: &PolicyId) -> String {
        format!("/policies/{}/delete", urlencoding::encode(&id.to_string()))
    }
}

pub fn render_page(tera: &tera::Tera, state: &ShellState) -> AppResult<String> {
    let mut context = tera::Context::new();
    context.insert("error", &state.error);
    context.insert("loading", &state.loading);
    context.insert("form", &state.form.view());
    context.insert("list", &list::render_rows(&state.policies, &FormPostActions));

    tera.render("index.html", &context).map_err(|e| {
        error!("Template rendering failed: {}", e);
        AppError::from(e)
    })
}

/// Full page. The first load of the process mounts the shell.
#[axum::debug_handler]
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.shell.mount().await;
    let snapshot = state.shell.snapshot().await;
    debug!(
        policies = snapshot.policies.len(),
        loading = snapshot.loading,
        "Rendering policy page"
    );
    render_page(&state.tera, &snapshot).map(Html)
}

#[axum::debug_handler]
pub async fn submit_policy(
    State(state): State<AppState>,
    Form(fields): Form<FormFields>,
) -> Redirect {
    match state.shell.submit(fields).await {
        SubmitOutcome::Saved(policy) => info!(policy_id = %policy.id, "Policy form submitted"),
        SubmitOutcome::Rejected(reason) => debug!(%reason, "Policy form rejected"),
        SubmitOutcome::InFlight => debug!("Duplicate policy form submission ignored"),
        SubmitOutcome::Failed(e) => debug!(error = %e, "Policy form submission failed"),
    }
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn select_for_edit(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    if let Some(id) = state.shell.resolve(&id).await {
        state.shell.select_for_edit(&id).await;
    }
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn cancel_edit(State(state): State<AppState>) -> Redirect {
    state.shell.clear_selection().await;
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn delete_policy(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    if let Some(id) = state.shell.resolve(&id).await {
        state.shell.delete(&id).await;
    }
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.shell.refetch().await;
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn dismiss_error(State(state): State<AppState>) -> Redirect {
    state.shell.dismiss_error().await;
    Redirect::to("/")
}

/// The collection as currently held by the shell - JSON API response
#[axum::debug_handler]
pub async fn list_policies_api(State(state): State<AppState>) -> Json<Vec<Policy>> {
    Json(state.shell.snapshot().await.policies)
}
