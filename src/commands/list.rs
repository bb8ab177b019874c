// ABOUTME: List command implementation.
// ABOUTME: Shows the newest registered task definition revisions of a family.

use ferry::cloud::AwsCli;
use ferry::config::Options;
use ferry::deploy;
use ferry::error::Result;
use ferry::output::Output;

/// Print up to `max_items` revisions, newest first.
pub async fn list(options: Options, max_items: usize, output: Output) -> Result<()> {
    let settings = options.list_settings()?;

    let cloud = AwsCli::new(settings.region.clone()).profile(options.profile.clone());
    let revisions = deploy::list(&cloud, &settings, max_items).await?;

    if revisions.is_empty() {
        output.success(&format!("No task definitions registered for {}", settings.family));
        return Ok(());
    }

    for listing in &revisions {
        output.item(&format!("{}:{}  {}", listing.family, listing.revision, listing.arn), listing);
    }
    Ok(())
}
