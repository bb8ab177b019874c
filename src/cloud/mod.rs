// ABOUTME: Identity and orchestration-service capabilities.
// ABOUTME: Defines the Identity and Orchestrator traits plus revision and service state types.

mod aws;
mod error;
pub mod task_definition;

pub use aws::AwsCli;
pub use error::CloudError;
pub use task_definition::{TaskDefinition, TaskDefinitionDraft};

use async_trait::async_trait;
use std::fmt;

use crate::engine::RegistryAuth;
use crate::types::ResourceName;

/// The caller's ambient cloud identity.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Account (tenant) the caller's credentials belong to.
    async fn tenant_id(&self) -> Result<String, CloudError>;

    /// Short-lived credentials for pushing to `registry_host`.
    async fn registry_auth(&self, registry_host: &str) -> Result<RegistryAuth, CloudError>;
}

/// Task definition and service operations.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Latest active revision of `family`, or `None` when the family has never been registered.
    async fn describe_task_definition(
        &self,
        family: &ResourceName,
    ) -> Result<Option<TaskDefinition>, CloudError>;

    /// Register `draft` as a new revision of its family.
    async fn register_task_definition(
        &self,
        draft: &TaskDefinitionDraft,
    ) -> Result<DefinitionRevision, CloudError>;

    /// Point `service` in `cluster` at `revision`.
    async fn update_service(
        &self,
        cluster: &ResourceName,
        service: &ResourceName,
        revision: &DefinitionRevision,
    ) -> Result<(), CloudError>;

    /// Block until the service reports a stable deployment.
    async fn wait_until_stable(
        &self,
        cluster: &ResourceName,
        service: &ResourceName,
    ) -> Result<(), CloudError>;

    /// Most recent revisions of `family`, newest first, at most `max_items`.
    async fn list_task_definitions(
        &self,
        family: &ResourceName,
        max_items: usize,
    ) -> Result<Vec<DefinitionRevision>, CloudError>;
}

/// A registered task definition revision, identified by its ARN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionRevision {
    arn: String,
    family: String,
    revision: u32,
}

impl DefinitionRevision {
    /// Parse `arn:<partition>:ecs:<region>:<account>:task-definition/<family>:<revision>`.
    pub fn from_arn(arn: &str) -> Result<Self, CloudError> {
        let malformed = || CloudError::MalformedArn {
            arn: arn.to_string(),
        };

        let (_, resource) = arn.split_once(":task-definition/").ok_or_else(malformed)?;
        let (family, revision) = resource.rsplit_once(':').ok_or_else(malformed)?;
        let revision = revision.parse().map_err(|_| malformed())?;
        if family.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            arn: arn.to_string(),
            family: family.to_string(),
            revision,
        })
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl fmt::Display for DefinitionRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.revision)
    }
}

/// Whether a service's running tasks match its desired definition and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Converging,
}

/// What a service points at after a roll-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceState {
    pub cluster: ResourceName,
    pub service: ResourceName,
    pub task_definition: DefinitionRevision,
    pub stability: Stability,
}
