//! Editable step list state machine

use crate::types::{AgentRef, Step};

/// Ordered, editable sequence of workflow steps.
///
/// Order is significant and is the sole ordering key handed to the
/// reconciler. All operations keep the list well formed: out-of-range
/// indices are no-ops rather than panics, and `insert_at` clamps to the
/// tail. Observers read values through `steps()` or `snapshot()`; no
/// operation exposes an intermediate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepList {
    steps: Vec<Step>,
}

impl StepList {
    /// Wrap an existing sequence of steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Clone the current sequence, e.g. to take a saved-state baseline.
    pub fn snapshot(&self) -> Vec<Step> {
        self.steps.clone()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Insert a fresh, agent-less step at `index`. Indices past the end
    /// clamp to an append.
    pub fn insert_at(&mut self, index: usize) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, Step::new());
    }

    /// Remove the step at `index`. Out-of-range indices are a no-op.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.steps.len() {
            self.steps.remove(index);
        }
    }

    /// Move the step at `from` to `to` in one atomic update, shifting
    /// everything strictly between the two positions by one. Either index
    /// out of range is a no-op.
    pub fn move_to(&mut self, from: usize, to: usize) {
        if from >= self.steps.len() || to >= self.steps.len() || from == to {
            return;
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
    }

    /// Bind an agent to the step at `index`, replacing any prior binding.
    pub fn assign_agent(&mut self, index: usize, agent: AgentRef) {
        if let Some(step) = self.steps.get_mut(index) {
            step.agent = Some(agent);
        }
    }

    /// Clear the agent binding on the step at `index`.
    pub fn unassign_agent(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            step.agent = None;
        }
    }

    /// Steps with an agent assigned, in list order.
    pub fn complete_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.is_complete())
    }
}
