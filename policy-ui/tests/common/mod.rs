//! In-process policy backend shared by the shell and route tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use policy_client::{ApiError, ApiResult, Policy, PolicyApi, PolicyDraft, PolicyId, PolicyType};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(PolicyDraft),
    Update(PolicyId, PolicyDraft),
    Delete(PolicyId),
}

/// A gate holds a call until the test releases it, and reports when the call arrived.
#[derive(Clone, Default)]
pub struct Gate {
    pub arrived: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub struct FakeApi {
    pub policies: Mutex<Vec<Policy>>,
    pub calls: Mutex<Vec<Call>>,
    pub fail_list: AtomicBool,
    pub fail_writes: AtomicBool,
    pub list_gates: Mutex<VecDeque<Gate>>,
    pub write_gate: Mutex<Option<Gate>>,
    next_id: AtomicU64,
}

impl FakeApi {
    pub fn seeded(policies: Vec<Policy>) -> Arc<Self> {
        let next = policies.len() as u64 + 100;
        let api = Self {
            policies: Mutex::new(policies),
            next_id: AtomicU64::new(next),
            ..Self::default()
        };
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(*c)).count()
    }

    pub fn gate_next_list(&self) -> Gate {
        let gate = Gate::default();
        self.list_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    pub fn gate_writes(&self) -> Gate {
        let gate = Gate::default();
        *self.write_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn hold_write(&self) {
        let gate = self.write_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.arrived.notify_one();
            gate.release.notified().await;
        }
    }

    fn write_failure(&self) -> ApiResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyApi for FakeApi {
    async fn list(&self) -> ApiResult<Vec<Policy>> {
        self.record(Call::List);
        // Answer with the data as it was when the request was made.
        let snapshot = self.policies.lock().unwrap().clone();
        let gate = self.list_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.arrived.notify_one();
            gate.release.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(snapshot)
    }

    async fn create(&self, draft: &PolicyDraft) -> ApiResult<Policy> {
        self.record(Call::Create(draft.clone()));
        self.hold_write().await;
        self.write_failure()?;
        let id = PolicyId::Numeric(self.next_id.fetch_add(1, Ordering::SeqCst));
        let policy = draft.clone().into_policy(id);
        self.policies.lock().unwrap().push(policy.clone());
        Ok(policy)
    }

    async fn update(&self, id: &PolicyId, draft: &PolicyDraft) -> ApiResult<Policy> {
        self.record(Call::Update(id.clone(), draft.clone()));
        self.hold_write().await;
        self.write_failure()?;
        let mut policies = self.policies.lock().unwrap();
        let slot = policies
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            })?;
        *slot = draft.clone().into_policy(id.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: &PolicyId) -> ApiResult<()> {
        self.record(Call::Delete(id.clone()));
        self.hold_write().await;
        self.write_failure()?;
        self.policies.lock().unwrap().retain(|p| &p.id != id);
        Ok(())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixed_today() -> NaiveDate {
    day(2024, 6, 10)
}

pub fn policy(id: u64, number: &str, name: &str) -> Policy {
    Policy {
        id: PolicyId::Numeric(id),
        policy_number: number.to_string(),
        insured_name: name.to_string(),
        start_date: day(2024, 1, 1),
        end_date: day(2025, 1, 1),
        policy_type: PolicyType::Health,
        premium: 250.0,
        description: None,
    }
}
