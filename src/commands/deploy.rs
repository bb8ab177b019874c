// ABOUTME: Deploy command implementation.
// ABOUTME: Builds, pushes and rolls out the checked-out commit.

use super::connection::Connections;
use ferry::config::Options;
use ferry::deploy;
use ferry::diagnostics::{Diagnostics, Warning};
use ferry::error::Result;
use ferry::output::Output;

/// Deploy HEAD to the configured service.
pub async fn deploy(options: Options, mut output: Output) -> Result<()> {
    let settings = options.deploy_settings()?;

    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} to {}/{}",
        settings.build.repository, settings.rollout.cluster, settings.rollout.service
    ));

    let connections = Connections::open(&settings.build, options.profile.clone(), &output)?;
    let outcome = deploy::deploy(connections.collaborators(), &settings, &output).await?;

    if outcome.first_deploy {
        diag.warn(Warning::default_definition(
            &settings.rollout.family,
            &outcome.service.task_definition,
        ));
    }
    diag.report(&output);

    output.success(&format!(
        "Deployed {} ({}) as {}",
        outcome.revision, outcome.image, outcome.service.task_definition
    ));
    Ok(())
}
