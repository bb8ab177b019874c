// ABOUTME: git2-backed implementation of SourceControl.
// ABOUTME: Opens the repository containing the build context on every call.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::build::CheckoutBuilder;
use git2::{BranchType, ObjectType, Repository};

use super::{SourceControl, SourceError};
use crate::types::{Revision, RevisionSpec};

/// A git working tree on the local filesystem.
#[derive(Debug, Clone)]
pub struct GitWorkspace {
    repo_path: PathBuf,
}

impl GitWorkspace {
    /// Locate the repository containing `path` (searching parent directories).
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let repo = Repository::discover(path.as_ref()).map_err(|e| {
            SourceError::Repository(format!(
                "no git repository at {}: {}",
                path.as_ref().display(),
                e.message()
            ))
        })?;

        let repo_path = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                SourceError::Repository("bare repositories have no working tree".into())
            })?;

        Ok(Self { repo_path })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn open(&self) -> Result<Repository, SourceError> {
        Ok(Repository::open(&self.repo_path)?)
    }
}

#[async_trait]
impl SourceControl for GitWorkspace {
    async fn resolve(&self, spec: &RevisionSpec) -> Result<Revision, SourceError> {
        let repo = self.open()?;

        let unknown = || SourceError::UnknownRevision(spec.to_string());
        let commit = repo
            .revparse_single(spec.as_str())
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| unknown())?;

        let revision = Revision::new(&commit.id().to_string()).map_err(|_| unknown())?;
        tracing::debug!(reference = %spec, revision = %revision.full(), "resolved revision");
        Ok(revision)
    }

    async fn current_reference(&self) -> Result<String, SourceError> {
        let repo = self.open()?;
        let head = repo.head()?;

        if head.is_branch()
            && let Some(name) = head.shorthand()
        {
            return Ok(name.to_string());
        }

        head.target()
            .map(|oid| oid.to_string())
            .ok_or_else(|| SourceError::Repository("HEAD does not point at a commit".into()))
    }

    async fn checkout(&self, reference: &str) -> Result<(), SourceError> {
        let repo = self.open()?;

        let checkout_err = |e: git2::Error| SourceError::Checkout {
            reference: reference.to_string(),
            reason: e.message().to_string(),
        };

        // Local branches re-attach HEAD; anything else leaves it detached.
        let (target, branch_name) = match repo.find_branch(reference, BranchType::Local) {
            Ok(branch) => {
                let branch_ref = branch.into_reference();
                let name = branch_ref.name().map(str::to_string);
                (branch_ref.peel(ObjectType::Commit)?, name)
            }
            Err(_) => {
                let object = repo
                    .revparse_single(reference)
                    .and_then(|obj| obj.peel(ObjectType::Commit))
                    .map_err(|_| SourceError::UnknownRevision(reference.to_string()))?;
                (object, None)
            }
        };

        let mut opts = CheckoutBuilder::new();
        opts.safe();
        repo.checkout_tree(&target, Some(&mut opts))
            .map_err(checkout_err)?;

        match branch_name {
            Some(name) => repo.set_head(&name).map_err(checkout_err)?,
            None => repo.set_head_detached(target.id()).map_err(checkout_err)?,
        }

        tracing::info!(reference, "checked out");
        Ok(())
    }
}
