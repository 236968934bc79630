//! Policy client - typed access to the insurance policy REST API
//!
//! Wraps the four operations of the `/policies/` resource collection (list,
//! create, update, delete) behind the [`PolicyApi`] trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::{HttpPolicyClient, PolicyApi, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use model::{Policy, PolicyDraft, PolicyId, PolicyType};
