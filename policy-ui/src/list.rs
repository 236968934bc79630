//! Record list view models
//!
//! The list only turns policies into rows. What "edit" and "delete" mean is
//! decided by whoever supplies the [`RowActions`].

use policy_client::{Policy, PolicyId, PolicyType};
use serde::Serialize;

pub const EMPTY_MESSAGE: &str = "No policies found. Add a new policy to get started.";

/// Caller-supplied targets for the per-row actions
pub trait RowActions {
    fn edit_action(&self, id: &PolicyId) -> String;
    fn delete_action(&self, id: &PolicyId) -> String;
}

#[derive(Serialize, Clone, Debug)]
pub struct PolicyRowVm {
    pub id: String,
    pub policy_number: String,
    pub insured_name: String,
    pub policy_type: &'static str,
    pub badge_class: &'static str,
    pub premium: String,
    pub period: String,
    pub edit_action: String,
    pub delete_action: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct PolicyListVm {
    pub rows: Vec<PolicyRowVm>,
    pub is_empty: bool,
    pub empty_message: &'static str,
}

pub fn format_premium(premium: f64) -> String {
    format!("${:.2}", premium)
}

fn badge_class(policy_type: PolicyType) -> &'static str {
    match policy_type {
        PolicyType::Health => "badge-health",
        PolicyType::Life => "badge-life",
        PolicyType::Auto => "badge-auto",
        PolicyType::Home => "badge-home",
    }
}

pub fn render_rows(policies: &[Policy], actions: &dyn RowActions) -> PolicyListVm {
    let rows = policies
        .iter()
        .map(|policy| PolicyRowVm {
            id: policy.id.to_string(),
            policy_number: policy.policy_number.clone(),
            insured_name: policy.insured_name.clone(),
            policy_type: policy.policy_type.as_str(),
            badge_class: badge_class(policy.policy_type),
            premium: format_premium(policy.premium),
            period: format!("{} to {}", policy.start_date, policy.end_date),
            edit_action: actions.edit_action(&policy.id),
            delete_action: actions.delete_action(&policy.id),
        })
        .collect::<Vec<_>>();

    PolicyListVm {
        is_empty: rows.is_empty(),
        rows,
        empty_message: EMPTY_MESSAGE,
    }
}
