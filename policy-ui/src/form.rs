//! Record form: edited field values, validation and create-or-update dispatch

use chrono::{Months, NaiveDate};
use policy_client::{ApiResult, Policy, PolicyApi, PolicyDraft, PolicyId, PolicyType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit policy. Please try again.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw field values as typed by the user. Every field is text, like an HTML form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub policy_number: String,
    #[serde(default)]
    pub insured_name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(rename(deserialize = "type"), default = "default_policy_type")]
    pub policy_type: String,
    #[serde(default)]
    pub premium: String,
    #[serde(default)]
    pub description: String,
}

fn default_policy_type() -> String {
    PolicyType::default().to_string()
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            policy_number: String::new(),
            insured_name: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            policy_type: default_policy_type(),
            premium: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Please fill in all required fields.")]
    MissingRequired,

    #[error("{field} must be a date in YYYY-MM-DD format.")]
    InvalidDate { field: &'static str },

    #[error("Premium must not be negative.")]
    NegativePremium,

    #[error("Unknown policy type: {0}.")]
    UnknownType(String),
}

impl FormFields {
    /// Pre-fill from a persisted record
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            policy_number: policy.policy_number.clone(),
            insured_name: policy.insured_name.clone(),
            start_date: policy.start_date.format(DATE_FORMAT).to_string(),
            end_date: policy.end_date.format(DATE_FORMAT).to_string(),
            policy_type: policy.policy_type.to_string(),
            premium: policy.premium.to_string(),
            description: policy.description.clone().unwrap_or_default(),
        }
    }

    /// Clean and check the fields, producing the body to send.
    ///
    /// Empty dates default to `today` and one calendar year after `today`.
    pub fn prepare(&self, today: NaiveDate) -> Result<PolicyDraft, FormError> {
        let policy_number = self.policy_number.trim().to_string();
        if policy_number.is_empty() || self.insured_name.trim().is_empty() {
            return Err(FormError::MissingRequired);
        }

        let premium = match self.premium.trim().parse::<f64>() {
            Ok(p) if p.is_finite() => p,
            _ => return Err(FormError::MissingRequired),
        };
        if premium < 0.0 {
            return Err(FormError::NegativePremium);
        }

        let policy_type = if self.policy_type.trim().is_empty() {
            PolicyType::default()
        } else {
            self.policy_type
                .parse::<PolicyType>()
                .map_err(|e| FormError::UnknownType(e.0))?
        };

        let start_date = parse_date_or(&self.start_date, "Start date", today)?;
        let end_date = parse_date_or(&self.end_date, "End date", one_year_after(today))?;

        Ok(PolicyDraft {
            policy_number,
            insured_name: self.insured_name.clone(),
            start_date,
            end_date,
            policy_type,
            premium,
            description: self.description.clone(),
        })
    }
}

fn parse_date_or(
    raw: &str,
    field: &'static str,
    fallback: NaiveDate,
) -> Result<NaiveDate, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(fallback);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FormError::InvalidDate { field })
}

/// Same calendar day next year; Feb 29 lands on Feb 28.
pub fn one_year_after(day: NaiveDate) -> NaiveDate {
    day.checked_add_months(Months::new(12)).unwrap_or(day)
}

/// What a validated submission will do against the API
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(PolicyDraft),
    Update(PolicyId, PolicyDraft),
}

impl Submission {
    /// Issue exactly one create or update call.
    pub async fn dispatch(&self, api: &dyn PolicyApi) -> ApiResult<Policy> {
        match self {
            Submission::Create(draft) => api.create(draft).await,
            Submission::Update(id, draft) => api.update(id, draft).await,
        }
    }
}

/// Why a submission never reached the API
#[derive(Debug, Clone, PartialEq)]
pub enum Blocked {
    InFlight,
    Invalid(FormError),
}

/// State of the record form
#[derive(Debug, Clone, Default)]
pub struct PolicyForm {
    pub fields: FormFields,
    pub error: Option<String>,
    pub submitting: bool,
    /// Id of the record being edited; `None` means the form creates.
    pub editing: Option<PolicyId>,
}

impl PolicyForm {
    /// Pre-fill from `policy`, or reset to empty defaults when there is none.
    /// An outstanding submission stays outstanding.
    pub fn load(&mut self, policy: Option<&Policy>) {
        let submitting = self.submitting;
        *self = match policy {
            Some(policy) => PolicyForm {
                fields: FormFields::from_policy(policy),
                editing: Some(policy.id.clone()),
                ..PolicyForm::default()
            },
            None => PolicyForm::default(),
        };
        self.submitting = submitting;
    }

    /// Record `fields` as the form's values and turn them into a submission.
    ///
    /// Marks the form in flight on success; the caller must follow up with
    /// [`PolicyForm::finish_submit`].
    pub fn begin_submit(
        &mut self,
        fields: FormFields,
        today: NaiveDate,
    ) -> Result<Submission, Blocked> {
        if self.submitting {
            return Err(Blocked::InFlight);
        }

        self.fields = fields;
        let draft = match self.fields.prepare(today) {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(Blocked::Invalid(e));
            }
        };

        self.submitting = true;
        Ok(match &self.editing {
            Some(id) => Submission::Update(id.clone(), draft),
            None => Submission::Create(draft),
        })
    }

    pub fn finish_submit<T, E>(&mut self, result: &Result<T, E>) {
        self.submitting = false;
        self.error = match result {
            Ok(_) => None,
            Err(_) => Some(SUBMIT_FAILED_MESSAGE.to_string()),
        };
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Policy"
        } else {
            "Add New Policy"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Policy"
        } else {
            "Add Policy"
        }
    }

    pub fn view(&self) -> FormVm {
        FormVm {
            fields: self.fields.clone(),
            error: self.error.clone(),
            submitting: self.submitting,
            editing: self.is_editing(),
            title: self.title(),
            submit_label: self.submit_label(),
            type_options: PolicyType::ALL
                .iter()
                .map(|t| TypeOptionVm {
                    value: t.as_str(),
                    selected: t.as_str() == self.fields.policy_type,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct TypeOptionVm {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct FormVm {
    pub fields: FormFields,
    pub error: Option<String>,
    pub submitting: bool,
    pub editing: bool,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub type_options: Vec<TypeOptionVm>,
}
