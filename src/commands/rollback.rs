// ABOUTME: Rollback command implementation.
// ABOUTME: Redeploys an earlier commit and restores the working tree afterwards.

use super::connection::Connections;
use ferry::config::Options;
use ferry::deploy;
use ferry::diagnostics::Diagnostics;
use ferry::error::Result;
use ferry::output::Output;

/// Redeploy `target_commit`, then return to the original branch or commit.
pub async fn rollback(
    options: Options,
    target_commit: Option<String>,
    mut output: Output,
) -> Result<()> {
    let (settings, target) = options.rollback_settings(target_commit.as_deref())?;

    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Rolling back {}/{} to {}",
        settings.rollout.cluster, settings.rollout.service, target
    ));

    let connections = Connections::open(&settings.build, options.profile.clone(), &output)?;
    let result = deploy::rollback(
        connections.collaborators(),
        &settings,
        &target,
        &output,
        &mut diag,
    )
    .await;

    diag.report(&output);

    let outcome = result?;
    output.success(&format!(
        "Rolled back to {} ({}); working tree restored to {}",
        outcome.deploy.revision, outcome.deploy.service.task_definition, outcome.restored
    ));
    Ok(())
}
