// ABOUTME: Error types for workflow stages.
// ABOUTME: DeployError classifies the failure; WorkflowError adds the stage it happened in.

use std::fmt;

use crate::cloud::CloudError;
use crate::engine::ImageError;
use crate::source::SourceError;

/// Workflow stages, named in progress output and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolving,
    CheckingOut,
    Building,
    Synthesizing,
    RollingOut,
    Restoring,
    Listing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolving => "resolve",
            Stage::CheckingOut => "checkout",
            Stage::Building => "build",
            Stage::Synthesizing => "synthesize",
            Stage::RollingOut => "roll-out",
            Stage::Restoring => "restore",
            Stage::Listing => "list",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during workflow stages.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The reference does not name a commit.
    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    /// The source repository could not be read.
    #[error("repository error: {0}")]
    Repository(String),

    /// The working tree could not be switched to the target.
    #[error("checkout failed: {0}")]
    Checkout(String),

    /// The caller's tenant could not be determined.
    #[error("identity lookup failed: {0}")]
    Identity(String),

    #[error("image build failed: {0}")]
    Build(String),

    /// Registry login or image push failed.
    #[error("image push failed: {0}")]
    Push(String),

    /// The current task definition could not be read.
    #[error("failed to describe task definition: {0}")]
    Describe(String),

    #[error("task definition registration rejected: {0}")]
    Registration(String),

    #[error("service update failed: {0}")]
    ServiceUpdate(String),

    /// The service did not report stable in time.
    #[error("service did not stabilize: {0}")]
    StabilizationTimeout(String),

    /// The original working tree could not be restored after a rollback.
    #[error("failed to restore {reference}: {reason}")]
    Restore { reference: String, reason: String },

    #[error("failed to list task definitions: {0}")]
    List(String),
}

/// Coarse classification of a [`DeployError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployErrorKind {
    UnknownRevision,
    Repository,
    Checkout,
    Identity,
    Build,
    Push,
    Describe,
    Registration,
    ServiceUpdate,
    StabilizationTimeout,
    Restore,
    List,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::UnknownRevision(_) => DeployErrorKind::UnknownRevision,
            DeployError::Repository(_) => DeployErrorKind::Repository,
            DeployError::Checkout(_) => DeployErrorKind::Checkout,
            DeployError::Identity(_) => DeployErrorKind::Identity,
            DeployError::Build(_) => DeployErrorKind::Build,
            DeployError::Push(_) => DeployErrorKind::Push,
            DeployError::Describe(_) => DeployErrorKind::Describe,
            DeployError::Registration(_) => DeployErrorKind::Registration,
            DeployError::ServiceUpdate(_) => DeployErrorKind::ServiceUpdate,
            DeployError::StabilizationTimeout(_) => DeployErrorKind::StabilizationTimeout,
            DeployError::Restore { .. } => DeployErrorKind::Restore,
            DeployError::List(_) => DeployErrorKind::List,
        }
    }
}

impl From<SourceError> for DeployError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::UnknownRevision(reference) => DeployError::UnknownRevision(reference),
            SourceError::Checkout { reference, reason } => {
                DeployError::Checkout(format!("{reference}: {reason}"))
            }
            SourceError::Repository(reason) => DeployError::Repository(reason),
        }
    }
}

/// Extension trait for classifying cloud errors by the call that produced them.
pub trait CloudErrorExt {
    fn into_deploy_error(self, wrap: fn(String) -> DeployError) -> DeployError;
}

impl CloudErrorExt for CloudError {
    fn into_deploy_error(self, wrap: fn(String) -> DeployError) -> DeployError {
        wrap(self.to_string())
    }
}

/// Extension trait for classifying image engine errors.
pub trait ImageErrorExt {
    fn into_deploy_error(self) -> DeployError;
}

impl ImageErrorExt for ImageError {
    fn into_deploy_error(self) -> DeployError {
        match self {
            ImageError::PushFailed(_) => DeployError::Push(self.to_string()),
            other => DeployError::Build(other.to_string()),
        }
    }
}

/// A [`DeployError`] tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct WorkflowError {
    pub stage: Stage,
    pub source: DeployError,
}

impl WorkflowError {
    pub fn new(stage: Stage, source: DeployError) -> Self {
        Self { stage, source }
    }

    pub fn kind(&self) -> DeployErrorKind {
        self.source.kind()
    }
}

/// Attach a stage to a stage-local result.
pub trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, WorkflowError>;
}

impl<T, E: Into<DeployError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, WorkflowError> {
        self.map_err(|e| WorkflowError::new(stage, e.into()))
    }
}
