// ABOUTME: Top-level build, deploy, rollback and list actions.
// ABOUTME: Drives the workflow states in order and restores the working tree after rollbacks.

use serde::Serialize;

use crate::cloud::{DefinitionRevision, Identity, Orchestrator, ServiceState};
use crate::config::{BuildSettings, DeploySettings, ListSettings, RolloutSettings};
use crate::diagnostics::{Diagnostics, Warning};
use crate::engine::ImageEngine;
use crate::output::Output;
use crate::source::SourceControl;
use crate::types::{ImageUri, Revision, RevisionSpec};

use super::Workflow;
use super::error::{AtStage, CloudErrorExt, DeployError, Stage, WorkflowError};
use super::state::Resolved;

/// The external systems a workflow talks to.
///
/// `cloud` provides both the caller identity and the orchestration service.
pub struct Collaborators<'t, G: ?Sized, E: ?Sized, C: ?Sized> {
    pub source: &'t G,
    pub engine: &'t E,
    pub cloud: &'t C,
}

impl<G: ?Sized, E: ?Sized, C: ?Sized> Clone for Collaborators<'_, G, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: ?Sized, E: ?Sized, C: ?Sized> Copy for Collaborators<'_, G, E, C> {}

/// Result of a build: the commit and the pushed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub revision: Revision,
    pub image: ImageUri,
}

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub revision: Revision,
    pub image: ImageUri,
    pub service: ServiceState,
    /// True when the family had no prior definition.
    pub first_deploy: bool,
}

/// Result of a rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOutcome {
    pub deploy: DeployOutcome,
    /// Reference the working tree was returned to.
    pub restored: String,
}

/// One registered revision, as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionListing {
    pub family: String,
    pub revision: u32,
    pub arn: String,
}

impl From<DefinitionRevision> for RevisionListing {
    fn from(rev: DefinitionRevision) -> Self {
        Self {
            family: rev.family().to_string(),
            revision: rev.revision(),
            arn: rev.arn().to_string(),
        }
    }
}

/// Build and push the image for the checked-out commit.
///
/// # Errors
///
/// Returns the first failing stage's error; nothing after it runs.
pub async fn build<G, E, C>(
    tools: Collaborators<'_, G, E, C>,
    settings: &BuildSettings,
    output: &Output,
) -> Result<BuildOutcome, WorkflowError>
where
    G: SourceControl + ?Sized,
    E: ImageEngine + ?Sized,
    C: Identity + ?Sized,
{
    output.progress("  → Resolving revision...");
    let resolved = Workflow::new(settings)
        .resolve(tools.source, &RevisionSpec::Current)
        .await?;

    output.progress(&format!(
        "  → Building {} at {}...",
        settings.repository,
        resolved.revision()
    ));
    let built = resolved.build(tools.engine, tools.cloud).await?;
    output.progress(&format!("  ✓ Pushed {}", built.image()));

    Ok(built.finish())
}

/// Build, push and roll out the checked-out commit.
///
/// # Errors
///
/// Returns the first failing stage's error; nothing after it runs.
pub async fn deploy<G, E, C>(
    tools: Collaborators<'_, G, E, C>,
    settings: &DeploySettings,
    output: &Output,
) -> Result<DeployOutcome, WorkflowError>
where
    G: SourceControl + ?Sized,
    E: ImageEngine + ?Sized,
    C: Identity + Orchestrator + ?Sized,
{
    output.progress("  → Resolving revision...");
    let resolved = Workflow::new(&settings.build)
        .resolve(tools.source, &RevisionSpec::Current)
        .await?;

    ship(tools, resolved, &settings.rollout, output).await
}

/// Redeploy an earlier commit, then return the working tree to where it was.
///
/// The original reference is restored on every exit path once checkout has
/// been attempted. A pipeline failure takes precedence over a restore
/// failure, which is then recorded in `diag`.
///
/// # Errors
///
/// Returns the pipeline's error, or `DeployError::Restore` if only the
/// restore failed.
pub async fn rollback<G, E, C>(
    tools: Collaborators<'_, G, E, C>,
    settings: &DeploySettings,
    target: &RevisionSpec,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<RollbackOutcome, WorkflowError>
where
    G: SourceControl + ?Sized,
    E: ImageEngine + ?Sized,
    C: Identity + Orchestrator + ?Sized,
{
    let original = tools
        .source
        .current_reference()
        .await
        .at(Stage::Resolving)?;

    output.progress(&format!("  → Resolving {target}..."));
    let resolved = Workflow::new(&settings.build)
        .resolve(tools.source, target)
        .await?;

    output.progress(&format!("  → Checking out {}...", resolved.revision()));
    let result = match tools
        .source
        .checkout(resolved.revision().full())
        .await
        .at(Stage::CheckingOut)
    {
        Ok(()) => ship(tools, resolved, &settings.rollout, output).await,
        Err(e) => Err(e),
    };

    output.progress(&format!("  → Restoring {original}..."));
    let restored = tools.source.checkout(&original).await;

    match (result, restored) {
        (Ok(deploy), Ok(())) => Ok(RollbackOutcome {
            deploy,
            restored: original,
        }),
        (Ok(_), Err(e)) => Err(WorkflowError::new(
            Stage::Restoring,
            DeployError::Restore {
                reference: original,
                reason: e.to_string(),
            },
        )),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(e)) => {
            diag.warn(Warning::restore_failed(&original, e));
            Err(err)
        }
    }
}

/// Newest registered revisions of a family.
///
/// # Errors
///
/// Returns `DeployError::List` if the service cannot be queried.
pub async fn list<O: Orchestrator + ?Sized>(
    orchestrator: &O,
    settings: &ListSettings,
    max_items: usize,
) -> Result<Vec<RevisionListing>, WorkflowError> {
    let revisions = orchestrator
        .list_task_definitions(&settings.family, max_items)
        .await
        .map_err(|e| e.into_deploy_error(DeployError::List))
        .at(Stage::Listing)?;

    Ok(revisions.into_iter().map(RevisionListing::from).collect())
}

/// Build, synthesize and roll out an already resolved revision.
async fn ship<G, E, C>(
    tools: Collaborators<'_, G, E, C>,
    resolved: Workflow<'_, Resolved>,
    rollout: &RolloutSettings,
    output: &Output,
) -> Result<DeployOutcome, WorkflowError>
where
    G: SourceControl + ?Sized,
    E: ImageEngine + ?Sized,
    C: Identity + Orchestrator + ?Sized,
{
    output.progress(&format!(
        "  → Building {} at {}...",
        resolved.settings().repository,
        resolved.revision()
    ));
    let built = resolved.build(tools.engine, tools.cloud).await?;
    output.progress(&format!("  ✓ Pushed {}", built.image()));

    output.progress(&format!("  → Preparing task definition {}...", rollout.family));
    let synthesized = built.synthesize(tools.cloud, rollout).await?;
    if synthesized.is_first_deploy() {
        output.progress("    (first deployment, using default task definition)");
    }

    output.progress(&format!(
        "  → Updating {}/{} and waiting for it to stabilize...",
        rollout.cluster, rollout.service
    ));
    let rolled_out = synthesized.roll_out(tools.cloud, rollout).await?;
    output.progress(&format!(
        "  ✓ {} running {}",
        rollout.service,
        rolled_out.service().task_definition
    ));

    Ok(rolled_out.finish())
}
