// ABOUTME: Temporary git repositories for source-control tests.
// ABOUTME: Creates commits, branches and tags with git2 on a scratch directory.

use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// An empty repository whose first branch is `main`.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `file` and commit it on the current branch.
    pub fn commit(&self, file: &str, contents: &str, message: &str) -> Oid {
        std::fs::write(self.dir.path().join(file), contents).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Lightweight tag pointing at `oid`.
    pub fn tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    pub fn head_branch(&self) -> Option<String> {
        let head = self.repo.head().unwrap();
        if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        }
    }
}
