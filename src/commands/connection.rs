// ABOUTME: Shared helper for opening the repository, engine and cloud clients.
// ABOUTME: Runs only after settings validate, so bad input never reaches a collaborator.

use ferry::cloud::AwsCli;
use ferry::config::BuildSettings;
use ferry::deploy::Collaborators;
use ferry::engine::BollardEngine;
use ferry::error::Result;
use ferry::output::Output;
use ferry::source::GitWorkspace;

/// Live collaborators for one invocation.
pub struct Connections {
    pub source: GitWorkspace,
    pub engine: BollardEngine,
    pub cloud: AwsCli,
}

impl Connections {
    /// Open the repository around the build context and connect to the local engine.
    pub fn open(
        settings: &BuildSettings,
        profile: Option<String>,
        output: &Output,
    ) -> Result<Self> {
        output.progress("  → Opening repository...");
        let source = GitWorkspace::discover(&settings.context)?;

        output.progress("  → Connecting to container engine...");
        let engine = BollardEngine::connect_local()?;

        let cloud = AwsCli::new(settings.region.clone()).profile(profile);

        Ok(Self {
            source,
            engine,
            cloud,
        })
    }

    pub fn collaborators(&self) -> Collaborators<'_, GitWorkspace, BollardEngine, AwsCli> {
        Collaborators {
            source: &self.source,
            engine: &self.engine,
            cloud: &self.cloud,
        }
    }
}
