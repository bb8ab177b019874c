// ABOUTME: Source control capability used to resolve and check out revisions.
// ABOUTME: Defines the SourceControl trait and its error type.

mod git;

pub use git::GitWorkspace;

use async_trait::async_trait;

use crate::types::{Revision, RevisionSpec};

/// Resolve, inspect and switch the working tree's revision.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Resolve a reference to the commit it names.
    async fn resolve(&self, spec: &RevisionSpec) -> Result<Revision, SourceError>;

    /// Branch name currently checked out, or the commit id when HEAD is detached.
    async fn current_reference(&self) -> Result<String, SourceError>;

    /// Check out a branch, tag or commit onto the working tree.
    async fn checkout(&self, reference: &str) -> Result<(), SourceError>;
}

/// Errors from source control operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    #[error("failed to check out {reference}: {reason}")]
    Checkout { reference: String, reason: String },

    #[error("repository error: {0}")]
    Repository(String),
}

impl From<git2::Error> for SourceError {
    fn from(err: git2::Error) -> Self {
        SourceError::Repository(err.message().to_string())
    }
}
