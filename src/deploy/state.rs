// ABOUTME: Workflow state marker types for the type state pattern.
// ABOUTME: Each state carries the data earlier stages produced.

use crate::cloud::{ServiceState, TaskDefinitionDraft};
use crate::types::{ImageUri, Revision};

/// Initial state: nothing resolved yet.
/// Available actions: `resolve()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Revision resolved to a commit.
/// Available actions: `build()`
#[derive(Debug, Clone)]
pub struct Resolved {
    pub(crate) revision: Revision,
}

/// Image built and pushed.
/// Available actions: `synthesize()`, `finish()`
#[derive(Debug, Clone)]
pub struct Built {
    pub(crate) revision: Revision,
    pub(crate) image: ImageUri,
}

/// Draft task definition derived, not yet registered.
/// Available actions: `roll_out()`
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub(crate) revision: Revision,
    pub(crate) image: ImageUri,
    pub(crate) draft: TaskDefinitionDraft,
    pub(crate) first_deploy: bool,
}

/// Service updated and stable.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct RolledOut {
    pub(crate) revision: Revision,
    pub(crate) image: ImageUri,
    pub(crate) service: ServiceState,
    pub(crate) first_deploy: bool,
}
