//! Workflow editor session
//!
//! [`WorkflowEditor`] owns the editable step list, the saved-state
//! baseline, and the single-save-in-flight guard. All mutation is funneled
//! through the operations here; UI hosts hold the editor and re-render
//! from `steps()` after each call.

pub mod reconcile;
pub mod steps;

pub use reconcile::{
    complete_payloads, plan_sync, reconcile, SaveError, SyncAction, SyncPlan, SyncReport,
    MIN_COMPLETE_STEPS,
};
pub use steps::StepList;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::api::{RemoteStep, StepStore};
use crate::types::{AgentRef, Step, Workflow};

/// Errors from list mutation operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// The list cannot be edited while a save is in flight; the host
    /// should disable mutation controls until the save settles.
    #[error("the step list cannot be edited while a save is in flight")]
    SaveInFlight,
}

/// Editing session for one workflow's step list.
pub struct WorkflowEditor {
    workflow: Workflow,
    steps: StepList,
    /// The list as of the last successful save (or initial seed).
    saved: Vec<Step>,
    save_in_flight: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl WorkflowEditor {
    /// Seed an editor from the server-side step list.
    ///
    /// Server steps get fresh client-local ids; reconciliation never
    /// matches on them. An empty server list seeds a single placeholder
    /// step so the host always has a row to bind an agent to.
    pub fn new(workflow: Workflow, mut server_steps: Vec<RemoteStep>) -> Self {
        server_steps.sort_by_key(|s| s.order);

        let seeded: Vec<Step> = if server_steps.is_empty() {
            vec![Step::new()]
        } else {
            server_steps
                .into_iter()
                .map(|s| Step::with_agent(s.agent))
                .collect()
        };

        Self {
            workflow,
            steps: StepList::new(seeded.clone()),
            saved: seeded,
            save_in_flight: false,
            last_saved_at: None,
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn steps(&self) -> &[Step] {
        self.steps.steps()
    }

    /// True iff the list differs structurally from the saved baseline.
    /// Drives whether the host enables its save control.
    pub fn is_dirty(&self) -> bool {
        self.steps.steps() != self.saved.as_slice()
    }

    /// True while a save is running; the host should show a busy
    /// indicator and disable save and mutation controls.
    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    fn guard_mutation(&self) -> Result<(), EditError> {
        if self.save_in_flight {
            Err(EditError::SaveInFlight)
        } else {
            Ok(())
        }
    }

    /// Insert a fresh, agent-less step at `index`.
    pub fn insert_at(&mut self, index: usize) -> Result<(), EditError> {
        self.guard_mutation()?;
        self.steps.insert_at(index);
        Ok(())
    }

    /// Remove the step at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<(), EditError> {
        self.guard_mutation()?;
        self.steps.remove_at(index);
        Ok(())
    }

    /// Move the step at `from` to `to` (drag-reorder).
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.guard_mutation()?;
        self.steps.move_to(from, to);
        Ok(())
    }

    /// Bind an agent to the step at `index`.
    pub fn assign_agent(&mut self, index: usize, agent: AgentRef) -> Result<(), EditError> {
        self.guard_mutation()?;
        self.steps.assign_agent(index, agent);
        Ok(())
    }

    /// Clear the agent binding on the step at `index`.
    pub fn unassign_agent(&mut self, index: usize) -> Result<(), EditError> {
        self.guard_mutation()?;
        self.steps.unassign_agent(index);
        Ok(())
    }

    /// Reconcile the current list against the server and, on full
    /// success, advance the saved baseline.
    ///
    /// The baseline becomes the unfiltered live list even though only
    /// complete steps were persisted, so an agent-less step can read as
    /// clean here while never existing server-side. That mirrors the
    /// shipped editor behavior and is kept deliberately.
    ///
    /// On failure the baseline is untouched: the list stays dirty and a
    /// retry re-runs full reconciliation from current state.
    pub async fn save(&mut self, store: &dyn StepStore) -> Result<SyncReport, SaveError> {
        if self.save_in_flight {
            return Err(SaveError::SaveInFlight);
        }

        self.save_in_flight = true;
        let result = reconcile(store, &self.workflow.id, self.steps.steps()).await;
        self.save_in_flight = false;

        match result {
            Ok(report) => {
                self.saved = self.steps.snapshot();
                self.last_saved_at = Some(Utc::now());
                Ok(report)
            }
            Err(err) => {
                warn!(workflow_id = %self.workflow.id, "workflow save failed: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, StepPayload};
    use std::sync::Mutex;

    fn agent(n: u32) -> AgentRef {
        AgentRef::new(format!("agent-{n}"), format!("Agent {n}"))
    }

    fn remote(id: &str, order: u32, n: u32) -> RemoteStep {
        RemoteStep {
            id: id.to_string(),
            order,
            agent: agent(n),
        }
    }

    fn workflow() -> Workflow {
        Workflow::new("wf-1", "Pipeline", "A test pipeline")
    }

    /// Minimal store: serves a fixed list, counts mutations, optionally
    /// fails every mutation.
    #[derive(Default)]
    struct FixedStore {
        server: Vec<RemoteStep>,
        mutations: Mutex<usize>,
        fail_mutations: bool,
    }

    #[async_trait::async_trait]
    impl StepStore for FixedStore {
        async fn fetch_steps(&self, _workflow_id: &str) -> Result<Vec<RemoteStep>, ApiError> {
            Ok(self.server.clone())
        }

        async fn create_step(
            &self,
            _workflow_id: &str,
            payload: &StepPayload,
        ) -> Result<RemoteStep, ApiError> {
            *self.mutations.lock().unwrap() += 1;
            if self.fail_mutations {
                return Err(ApiError::http("steps", 500, "injected failure"));
            }
            Ok(RemoteStep {
                id: "new".to_string(),
                order: payload.order,
                agent: AgentRef::new(payload.agent_id.clone(), String::new()),
            })
        }

        async fn patch_step(
            &self,
            _workflow_id: &str,
            step_id: &str,
            payload: &StepPayload,
        ) -> Result<RemoteStep, ApiError> {
            *self.mutations.lock().unwrap() += 1;
            if self.fail_mutations {
                return Err(ApiError::http("steps", 500, "injected failure"));
            }
            Ok(RemoteStep {
                id: step_id.to_string(),
                order: payload.order,
                agent: AgentRef::new(payload.agent_id.clone(), String::new()),
            })
        }

        async fn delete_step(&self, _workflow_id: &str, _step_id: &str) -> Result<(), ApiError> {
            *self.mutations.lock().unwrap() += 1;
            if self.fail_mutations {
                return Err(ApiError::http("steps", 500, "injected failure"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_empty_server_list_seeds_placeholder() {
        let editor = WorkflowEditor::new(workflow(), vec![]);
        assert_eq!(editor.steps().len(), 1);
        assert!(editor.steps()[0].agent.is_none());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_seeding_sorts_by_server_order() {
        let editor = WorkflowEditor::new(
            workflow(),
            vec![remote("b", 1, 2), remote("a", 0, 1)],
        );
        let agents: Vec<_> = editor
            .steps()
            .iter()
            .map(|s| s.agent.as_ref().unwrap().id.clone())
            .collect();
        assert_eq!(agents, vec!["agent-1", "agent-2"]);
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let mut editor = WorkflowEditor::new(workflow(), vec![remote("a", 0, 1)]);
        assert!(!editor.is_dirty());

        editor.insert_at(1).unwrap();
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_reorder_marks_dirty() {
        let mut editor =
            WorkflowEditor::new(workflow(), vec![remote("a", 0, 1), remote("b", 1, 2)]);
        editor.move_to(1, 0).unwrap();
        assert!(editor.is_dirty());
    }

    #[tokio::test]
    async fn test_save_clears_dirty_until_next_mutation() {
        let store = FixedStore {
            server: vec![remote("a", 0, 1), remote("b", 1, 2)],
            ..FixedStore::default()
        };
        let mut editor =
            WorkflowEditor::new(workflow(), vec![remote("a", 0, 1), remote("b", 1, 2)]);

        editor.move_to(1, 0).unwrap();
        assert!(editor.is_dirty());

        let report = editor.save(&store).await.unwrap();
        assert_eq!(report.patched, 2);
        assert!(!editor.is_dirty());
        assert!(editor.last_saved_at().is_some());

        editor.unassign_agent(0).unwrap();
        assert!(editor.is_dirty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_list_dirty() {
        let store = FixedStore {
            server: vec![remote("a", 0, 1), remote("b", 1, 2)],
            fail_mutations: true,
            ..FixedStore::default()
        };
        let mut editor =
            WorkflowEditor::new(workflow(), vec![remote("a", 0, 1), remote("b", 1, 2)]);

        editor.move_to(1, 0).unwrap();
        let err = editor.save(&store).await.unwrap_err();
        assert!(matches!(err, SaveError::Remote(_)));
        assert!(editor.is_dirty());
        assert!(editor.last_saved_at().is_none());
        assert!(!editor.is_saving());
    }

    #[tokio::test]
    async fn test_insufficient_steps_rejected_locally() {
        let store = FixedStore::default();
        let mut editor = WorkflowEditor::new(workflow(), vec![]);
        editor.assign_agent(0, agent(1)).unwrap();

        let err = editor.save(&store).await.unwrap_err();
        assert!(matches!(err, SaveError::InsufficientSteps { have: 1 }));
        assert_eq!(*store.mutations.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_step_clean_after_save_but_unpersisted() {
        // the unfiltered list becomes the baseline: an agent-less step
        // reads as clean even though it was never sent to the server
        let store = FixedStore {
            server: vec![remote("a", 0, 1), remote("b", 1, 2)],
            ..FixedStore::default()
        };
        let mut editor =
            WorkflowEditor::new(workflow(), vec![remote("a", 0, 1), remote("b", 1, 2)]);

        editor.insert_at(2).unwrap(); // incomplete tail step
        assert!(editor.is_dirty());

        let report = editor.save(&store).await.unwrap();
        assert!(report.is_noop());
        assert!(!editor.is_dirty());
        assert_eq!(editor.steps().len(), 3);
    }

    #[test]
    fn test_mutations_rejected_while_saving() {
        let mut editor = WorkflowEditor::new(workflow(), vec![remote("a", 0, 1)]);
        editor.save_in_flight = true;

        assert_eq!(editor.insert_at(0), Err(EditError::SaveInFlight));
        assert_eq!(editor.remove_at(0), Err(EditError::SaveInFlight));
        assert_eq!(editor.move_to(0, 0), Err(EditError::SaveInFlight));
        assert_eq!(
            editor.assign_agent(0, agent(1)),
            Err(EditError::SaveInFlight)
        );
        assert_eq!(editor.unassign_agent(0), Err(EditError::SaveInFlight));
        assert_eq!(editor.steps().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_save_rejected() {
        let store = FixedStore::default();
        let mut editor = WorkflowEditor::new(workflow(), vec![remote("a", 0, 1)]);
        editor.save_in_flight = true;

        let err = editor.save(&store).await.unwrap_err();
        assert!(matches!(err, SaveError::SaveInFlight));
    }
}
