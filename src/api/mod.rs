//! Step store capability and wire types
//!
//! The editor core talks to the backing API through the [`StepStore`]
//! trait; [`RestStepStore`] is the production implementation. Keeping the
//! seam abstract lets the reconciler run against a recording mock in tests.

pub mod error;
mod rest;

pub use error::ApiError;
pub use rest::RestStepStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::AgentRef;

/// A workflow step as known to the server.
///
/// `id` is server-assigned and has no relationship to the client-local
/// ids in [`crate::types::Step`]; reconciliation matches by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStep {
    pub id: String,
    pub order: u32,
    pub agent: AgentRef,
}

/// Body for step create and patch calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    pub order: u32,
    pub agent_id: String,
}

/// Remote CRUD capability for a workflow's step list.
///
/// All four operations may fail with a transport or server error; the
/// reconciler propagates failures without retrying.
#[async_trait]
pub trait StepStore: Send + Sync {
    /// Fetch the current server-side step list, ordered by `order`.
    async fn fetch_steps(&self, workflow_id: &str) -> Result<Vec<RemoteStep>, ApiError>;

    /// Create a step at the position given in the payload.
    async fn create_step(
        &self,
        workflow_id: &str,
        payload: &StepPayload,
    ) -> Result<RemoteStep, ApiError>;

    /// Overwrite an existing step's order and agent binding.
    async fn patch_step(
        &self,
        workflow_id: &str,
        step_id: &str,
        payload: &StepPayload,
    ) -> Result<RemoteStep, ApiError>;

    /// Delete a step by its server-assigned id.
    async fn delete_step(&self, workflow_id: &str, step_id: &str) -> Result<(), ApiError>;
}
