// ABOUTME: Build and deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Workflow struct and the top-level actions.

mod actions;
mod error;
mod state;
mod synthesize;
mod transitions;
mod workflow;

pub use actions::{
    BuildOutcome, Collaborators, DeployOutcome, RevisionListing, RollbackOutcome, build, deploy,
    list, rollback,
};
pub use error::{
    AtStage, CloudErrorExt, DeployError, DeployErrorKind, ImageErrorExt, Stage, WorkflowError,
};
pub use state::{Built, Idle, Resolved, RolledOut, Synthesized};
pub use synthesize::synthesize;
pub use workflow::Workflow;
