// ABOUTME: Generic workflow struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::cloud::{ServiceState, TaskDefinitionDraft};
use crate::config::BuildSettings;
use crate::types::{ImageUri, Revision};

use super::state::{Built, Idle, Resolved, RolledOut, Synthesized};

/// A build or deployment in progress, parameterized by its current state.
///
/// The state type parameter `S` carries what earlier stages produced (the
/// resolved revision, the pushed image, the draft definition). A stage can
/// only be called once its inputs exist.
#[derive(Debug)]
pub struct Workflow<'a, S> {
    pub(crate) settings: &'a BuildSettings,
    pub(crate) state: S,
}

impl<'a> Workflow<'a, Idle> {
    pub fn new(settings: &'a BuildSettings) -> Self {
        Workflow {
            settings,
            state: Idle,
        }
    }
}

impl<'a, S> Workflow<'a, S> {
    pub fn settings(&self) -> &'a BuildSettings {
        self.settings
    }

    /// Move to the next state, carrying over whatever the current one holds.
    pub(crate) fn advance<T>(self, next: impl FnOnce(S) -> T) -> Workflow<'a, T> {
        Workflow {
            settings: self.settings,
            state: next(self.state),
        }
    }
}

impl Workflow<'_, Resolved> {
    pub fn revision(&self) -> &Revision {
        &self.state.revision
    }
}

impl Workflow<'_, Built> {
    pub fn revision(&self) -> &Revision {
        &self.state.revision
    }

    pub fn image(&self) -> &ImageUri {
        &self.state.image
    }
}

impl Workflow<'_, Synthesized> {
    pub fn revision(&self) -> &Revision {
        &self.state.revision
    }

    pub fn image(&self) -> &ImageUri {
        &self.state.image
    }

    /// The definition that will be registered.
    pub fn draft(&self) -> &TaskDefinitionDraft {
        &self.state.draft
    }

    /// True when the family had no prior definition.
    pub fn is_first_deploy(&self) -> bool {
        self.state.first_deploy
    }
}

impl Workflow<'_, RolledOut> {
    pub fn revision(&self) -> &Revision {
        &self.state.revision
    }

    pub fn image(&self) -> &ImageUri {
        &self.state.image
    }

    pub fn service(&self) -> &ServiceState {
        &self.state.service
    }
}
