//! Core data types shared by the editor and API layers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to an agent a step delegates to.
///
/// Agents are owned by the agents service; the editor only reads them and
/// assigns/unassigns references, never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    /// Server-assigned agent identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl AgentRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One position in a workflow's ordered execution sequence.
///
/// `id` is client-local identity: stable across reorders, regenerated for
/// new steps, and never matched against server-assigned step ids (server
/// steps are matched by position, not id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub agent: Option<AgentRef>,
}

impl Step {
    /// Create an empty step with a fresh client-local id and no agent.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: None,
        }
    }

    /// Create a step already bound to an agent.
    pub fn with_agent(agent: AgentRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: Some(agent),
        }
    }

    /// A step is complete once an agent is assigned. Only complete steps
    /// are eligible for persistence.
    pub fn is_complete(&self) -> bool {
        self.agent.is_some()
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only display data for the workflow being edited.
///
/// The editor only reads the id to address remote calls; name and
/// description are display data owned by the settings service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Workflow {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_step_is_incomplete() {
        let step = Step::new();
        assert!(step.agent.is_none());
        assert!(!step.is_complete());
    }

    #[test]
    fn test_step_with_agent_is_complete() {
        let step = Step::with_agent(AgentRef::new("agent-1", "Researcher"));
        assert!(step.is_complete());
    }

    #[test]
    fn test_step_ids_are_unique() {
        let a = Step::new();
        let b = Step::new();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_step_equality_is_structural() {
        let agent = AgentRef::new("agent-1", "Researcher");
        let step = Step::with_agent(agent.clone());
        let copy = step.clone();
        assert_eq!(step, copy);

        let mut reassigned = step.clone();
        reassigned.agent = Some(AgentRef::new("agent-2", "Writer"));
        assert_ne!(step, reassigned);
    }

    #[test]
    fn test_workflow_description_defaults_empty() {
        let workflow: Workflow =
            serde_json::from_str(r#"{"id": "wf-1", "name": "Pipeline"}"#).unwrap();
        assert_eq!(workflow.description, "");
    }
}
