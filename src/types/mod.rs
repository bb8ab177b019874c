// ABOUTME: Validated domain types shared across the workflow.
// ABOUTME: Revisions, image references and resource names.

mod image_uri;
mod resource_name;
mod revision;

pub use image_uri::ImageUri;
pub use resource_name::{RepositoryName, ResourceName, ResourceNameError};
pub use revision::{Revision, RevisionError, RevisionSpec};
