//! Positional reconciliation of the local step list against the server
//!
//! On save, the authoritative server list is fetched and both lists are
//! walked position by position, emitting exactly one of create, patch,
//! delete, or nothing per position. Matching is purely positional: there is
//! no stable key correlating client steps to server steps, so reordering
//! two saved steps shows up as two patches with swapped agent ids, never a
//! move. That limitation is inherited from the protocol and preserved here.

use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiError, RemoteStep, StepPayload, StepStore};
use crate::types::Step;

/// A workflow must have at least this many agent-bound steps to be saved.
pub const MIN_COMPLETE_STEPS: usize = 2;

/// Errors from a save attempt.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Fewer than [`MIN_COMPLETE_STEPS`] steps have an agent assigned.
    /// Recovered locally; no remote call is made.
    #[error("a workflow needs at least {MIN_COMPLETE_STEPS} steps with an agent assigned (have {have})")]
    InsufficientSteps { have: usize },

    /// Another save is still running. Saves are strictly one at a time.
    #[error("a save is already in flight")]
    SaveInFlight,

    /// A remote call failed. Not retried; the remaining plan is abandoned
    /// and already-applied calls are left as-is. Re-running reconciliation
    /// from current state is safe because positional sync is idempotent
    /// once server and local converge.
    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// One remote mutation in a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Create {
        payload: StepPayload,
    },
    Patch {
        step_id: String,
        payload: StepPayload,
    },
    Delete {
        step_id: String,
    },
}

/// Ordered mutation plan for one save, ascending by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
    /// Positions where server and local already agree.
    pub unchanged: usize,
}

/// Counts of remote mutations applied by a completed reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub patched: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl SyncReport {
    /// True when the save issued no remote mutations at all.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.patched == 0 && self.deleted == 0
    }

    /// Get a summary message
    pub fn summary(&self) -> String {
        format!(
            "created: {}, patched: {}, deleted: {}, unchanged: {}",
            self.created, self.patched, self.deleted, self.unchanged
        )
    }
}

/// Project the complete steps of a local list into positional payloads.
///
/// Incomplete steps are dropped silently; the surviving steps are
/// renumbered densely from zero.
pub fn complete_payloads(steps: &[Step]) -> Vec<StepPayload> {
    steps
        .iter()
        .filter_map(|s| s.agent.as_ref())
        .enumerate()
        .map(|(position, agent)| StepPayload {
            order: position as u32,
            agent_id: agent.id.clone(),
        })
        .collect()
}

/// Compute the ordered mutation plan converging `server` to `local`.
///
/// For each position in `0..max(local.len(), server.len())`:
/// - server only: delete the server step
/// - local only: create at that position
/// - both, differing in order or agent: patch the server step
/// - both, equal: nothing
pub fn plan_sync(local: &[StepPayload], server: &[RemoteStep]) -> SyncPlan {
    let span = local.len().max(server.len());
    let mut plan = SyncPlan::default();

    for position in 0..span {
        match (local.get(position), server.get(position)) {
            (Some(want), None) => plan.actions.push(SyncAction::Create {
                payload: want.clone(),
            }),
            (None, Some(have)) => plan.actions.push(SyncAction::Delete {
                step_id: have.id.clone(),
            }),
            (Some(want), Some(have)) => {
                if have.order != want.order || have.agent.id != want.agent_id {
                    plan.actions.push(SyncAction::Patch {
                        step_id: have.id.clone(),
                        payload: want.clone(),
                    });
                } else {
                    plan.unchanged += 1;
                }
            }
            (None, None) => unreachable!("position bounded by max of both lengths"),
        }
    }

    plan
}

/// Run a full reconciliation of `local_steps` against the server.
///
/// Validation happens before any remote call: fewer than
/// [`MIN_COMPLETE_STEPS`] complete steps fails fast with zero remote
/// effect. After that, plan application is strictly sequential in
/// ascending position order, each call awaited before the next. The first
/// failure aborts the remainder; nothing is rolled back.
pub async fn reconcile(
    store: &dyn StepStore,
    workflow_id: &str,
    local_steps: &[Step],
) -> Result<SyncReport, SaveError> {
    let wanted = complete_payloads(local_steps);
    if wanted.len() < MIN_COMPLETE_STEPS {
        return Err(SaveError::InsufficientSteps { have: wanted.len() });
    }

    let server = store.fetch_steps(workflow_id).await?;
    let plan = plan_sync(&wanted, &server);
    debug!(
        workflow_id,
        actions = plan.actions.len(),
        unchanged = plan.unchanged,
        "computed step sync plan"
    );

    let mut report = SyncReport {
        unchanged: plan.unchanged,
        ..SyncReport::default()
    };

    for action in plan.actions {
        match action {
            SyncAction::Create { payload } => {
                store.create_step(workflow_id, &payload).await?;
                report.created += 1;
            }
            SyncAction::Patch { step_id, payload } => {
                store.patch_step(workflow_id, &step_id, &payload).await?;
                report.patched += 1;
            }
            SyncAction::Delete { step_id } => {
                store.delete_step(workflow_id, &step_id).await?;
                report.deleted += 1;
            }
        }
    }

    info!(workflow_id, "saved workflow steps ({})", report.summary());
    Ok(report)
}
