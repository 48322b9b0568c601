//! Flowdeck - headless core for a workflow step editor
//!
//! A workflow is an ordered sequence of steps, each optionally bound to an
//! agent. This crate implements the editor's non-visual core: the editable
//! step list with dirty tracking, the positional reconciliation that syncs
//! local edits to the server as create/patch/delete calls, and the
//! best-effort deploy-as-bot clients. Rendering, drag-and-drop mechanics,
//! and notifications belong to the UI host.

pub mod api;
pub mod config;
pub mod deploy;
pub mod editor;
pub mod types;

pub use api::{ApiError, RemoteStep, RestStepStore, StepPayload, StepStore};
pub use config::Config;
pub use deploy::{DeployClient, DeployRequest};
pub use editor::{EditError, SaveError, StepList, SyncReport, WorkflowEditor};
pub use types::{AgentRef, Step, Workflow};
