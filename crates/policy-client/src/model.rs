//! Policy records as exchanged with the policy API.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Server-assigned identifier. Backends hand these out as integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyId::Numeric(n) => write!(f, "{}", n),
            PolicyId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PolicyId {
    /// Whether `key` is this id's text form, as it appears in URLs.
    ///
    /// `"007"` and `"7"` are different keys; only the stored id knows its
    /// own spelling.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            PolicyId::Numeric(n) => key == n.to_string(),
            PolicyId::Text(s) => s == key,
        }
    }
}

/// Kind of cover a policy provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PolicyType {
    #[default]
    Health,
    Life,
    Auto,
    Home,
}

impl PolicyType {
    pub const ALL: [PolicyType; 4] = [
        PolicyType::Health,
        PolicyType::Life,
        PolicyType::Auto,
        PolicyType::Home,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Health => "Health",
            PolicyType::Life => "Life",
            PolicyType::Auto => "Auto",
            PolicyType::Home => "Home",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown policy type: {0}")]
pub struct UnknownPolicyType(pub String);

impl FromStr for PolicyType {
    type Err = UnknownPolicyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPolicyType(s.to_string()))
    }
}

/// A persisted policy record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: String,
    pub insured_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    #[serde(deserialize_with = "deserialize_premium")]
    pub premium: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Policy body sent on create and update. Never carries an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub policy_number: String,
    pub insured_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    #[serde(deserialize_with = "deserialize_premium")]
    pub premium: f64,
    #[serde(default)]
    pub description: String,
}

impl PolicyDraft {
    /// Attach a server-assigned identifier.
    pub fn into_policy(self, id: PolicyId) -> Policy {
        Policy {
            id,
            policy_number: self.policy_number,
            insured_name: self.insured_name,
            start_date: self.start_date,
            end_date: self.end_date,
            policy_type: self.policy_type,
            premium: self.premium,
            description: Some(self.description),
        }
    }
}

// Decimal fields frequently arrive as strings ("120.50").
fn deserialize_premium<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("premium is not a number: {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_decodes_numeric_id_and_string_premium() {
        let policy: Policy = serde_json::from_value(json!({
            "id": 7,
            "policy_number": "P-7",
            "insured_name": "Ada Lovelace",
            "start_date": "2024-01-01",
            "end_date": "2025-01-01",
            "type": "Life",
            "premium": "99.90",
            "description": null
        }))
        .unwrap();

        assert_eq!(policy.id, PolicyId::Numeric(7));
        assert_eq!(policy.policy_type, PolicyType::Life);
        assert!((policy.premium - 99.9).abs() < f64::EPSILON);
        assert_eq!(policy.description, None);
    }

    #[test]
    fn test_policy_rejects_garbage_premium() {
        let result: Result<Policy, _> = serde_json::from_value(json!({
            "id": "abc",
            "policy_number": "P-1",
            "insured_name": "Jane Doe",
            "start_date": "2024-01-01",
            "end_date": "2025-01-01",
            "type": "Home",
            "premium": "lots"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_serializes_without_id_and_with_type_key() {
        let draft = PolicyDraft {
            policy_number: "P-1".to_string(),
            insured_name: "Jane Doe".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            policy_type: PolicyType::Auto,
            premium: 120.5,
            description: "test".to_string(),
        };

        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["type"], "Auto");
        assert_eq!(value["premium"], json!(120.5));
        assert_eq!(value["start_date"], "2024-03-01");
    }

    #[test]
    fn test_policy_id_keys_keep_their_spelling() {
        assert!(PolicyId::Numeric(42).matches_key("42"));
        assert!(!PolicyId::Numeric(7).matches_key("007"));
        assert!(PolicyId::Text("42".to_string()).matches_key("42"));
        assert!(PolicyId::Text("007".to_string()).matches_key("007"));
        assert!(!PolicyId::Text("007".to_string()).matches_key("7"));
        assert_eq!(PolicyId::Numeric(42).to_string(), "42");
    }

    #[test]
    fn test_string_id_decodes_as_text() {
        let id: PolicyId = serde_json::from_value(json!("007")).unwrap();
        assert_eq!(id, PolicyId::Text("007".to_string()));
        assert_eq!(id.to_string(), "007");
    }

    #[test]
    fn test_unknown_policy_type_message() {
        let err = "Pet".parse::<PolicyType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown policy type: Pet");
    }

    #[test]
    fn test_policy_type_parsing() {
        assert_eq!("auto".parse::<PolicyType>().unwrap(), PolicyType::Auto);
        assert_eq!(" Home ".parse::<PolicyType>().unwrap(), PolicyType::Home);
        assert!("Pet".parse::<PolicyType>().is_err());
        assert_eq!(PolicyType::default(), PolicyType::Health);
    }
}
