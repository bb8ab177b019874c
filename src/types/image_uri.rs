// ABOUTME: Fully-qualified reference to a built and pushed container image.
// ABOUTME: Derived from tenant, region, repository and revision short form.

use std::fmt;

use super::{RepositoryName, Revision};

/// Where a built image lives in the registry.
///
/// The identity of an image is the tuple `(tenant, region, repository, tag)`;
/// see [`ImageUri::canonical`]. `Display` renders the registry-addressable
/// form used for tagging, pushing and task definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageUri {
    tenant: String,
    region: String,
    repository: RepositoryName,
    tag: String,
}

impl ImageUri {
    pub fn new(
        tenant: &str,
        region: &str,
        repository: &RepositoryName,
        revision: &Revision,
    ) -> Self {
        Self {
            tenant: tenant.to_string(),
            region: region.to_string(),
            repository: repository.clone(),
            tag: revision.short().to_string(),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Registry host serving this tenant and region.
    pub fn registry_host(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.tenant, self.region)
    }

    /// Registry-qualified name without the tag.
    pub fn remote_name(&self) -> String {
        format!("{}/{}", self.registry_host(), self.repository)
    }

    /// Tag applied to the image in the local engine only.
    pub fn local_tag(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// `{tenant}.{region}.{repository}:{tag}`
    pub fn canonical(&self) -> String {
        format!(
            "{}.{}.{}:{}",
            self.tenant, self.region, self.repository, self.tag
        )
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.remote_name(), self.tag)
    }
}
