// ABOUTME: Build command implementation.
// ABOUTME: Builds and pushes the image for the checked-out commit.

use super::connection::Connections;
use ferry::config::Options;
use ferry::deploy;
use ferry::error::Result;
use ferry::output::Output;

/// Build and push the image for HEAD.
pub async fn build(options: Options, mut output: Output) -> Result<()> {
    let settings = options.build_settings()?;

    output.start_timer();
    output.progress(&format!(
        "Building {} from {}",
        settings.repository,
        settings.context.display()
    ));

    let connections = Connections::open(&settings, options.profile.clone(), &output)?;
    let outcome = deploy::build(connections.collaborators(), &settings, &output).await?;

    output.success(&format!("Pushed {}", outcome.image));
    Ok(())
}
