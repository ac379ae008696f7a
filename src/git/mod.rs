//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the local git
//! engine, allowing for multiple implementations including real
//! repositories and mock implementations for testing.
//!
//! The primary abstraction is the [GitOps] trait. Concrete
//! implementations:
//!
//! - [repository::Git2Backend]: a real implementation using the `git2` crate
//! - [mock::MockGit]: a mock implementation for testing
//!
//! Workflow code depends on the trait, never on a concrete backend.

pub mod mock;
pub mod repository;

pub use mock::MockGit;
pub use repository::Git2Backend;

use crate::error::Result;

/// Working-tree status, grouped the way the workflow consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    /// Paths with unresolved merge conflicts
    pub conflicted: Vec<String>,
    /// Untracked paths
    pub not_added: Vec<String>,
    /// Paths newly added to the index
    pub created: Vec<String>,
    /// Deleted paths
    pub deleted: Vec<String>,
    /// Modified paths
    pub modified: Vec<String>,
    /// Renamed paths
    pub renamed: Vec<String>,
}

impl StatusSummary {
    /// True when nothing is pending and nothing is conflicted.
    pub fn is_clean(&self) -> bool {
        self.conflicted.is_empty() && self.pending_paths().is_empty()
    }

    /// Every path that should be staged before a commit. Conflicted paths
    /// are excluded; they block the workflow instead.
    pub fn pending_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .not_added
            .iter()
            .chain(&self.created)
            .chain(&self.deleted)
            .chain(&self.modified)
            .chain(&self.renamed)
            .cloned()
            .collect();
        paths.dedup();
        paths
    }
}

/// Structured pull failure, classified by the backend from error class and
/// code rather than from message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullFailure {
    /// The remote rejected our credentials (usually a missing SSH key)
    AuthRejected,
    /// The named branch does not exist on the remote
    RemoteBranchMissing(String),
    /// Anything else
    Other(String),
}

/// Local repository operations consumed by the workflow engine.
pub trait GitOps {
    /// Whether the project directory already has a repository.
    fn is_initialized(&self) -> bool;

    /// Create an empty repository in the project directory.
    fn init(&mut self) -> Result<()>;

    /// Inspect the working tree.
    fn status(&mut self) -> Result<StatusSummary>;

    /// Stage the given paths, including deletions.
    fn add(&mut self, paths: &[String]) -> Result<()>;

    /// Commit the staged changes.
    fn commit(&mut self, message: &str) -> Result<()>;

    /// Names of configured remotes.
    fn remotes(&mut self) -> Result<Vec<String>>;

    /// Register a remote.
    fn add_remote(&mut self, name: &str, url: &str) -> Result<()>;

    /// Fetch `branch` from `remote` and merge it into the current HEAD.
    ///
    /// A conflicted merge is NOT a failure here: conflict markers are left
    /// in the working tree for the conflict guard to report. Failures are
    /// classified into [PullFailure].
    fn pull(
        &mut self,
        remote: &str,
        branch: &str,
        allow_unrelated: bool,
    ) -> std::result::Result<(), PullFailure>;

    /// Push `branch` to `remote`.
    fn push(&mut self, remote: &str, branch: &str) -> Result<()>;

    /// Ref names advertised by `origin` (`ls-remote --refs` equivalent).
    fn list_remote_refs(&mut self) -> Result<Vec<String>>;

    /// Names of local branches.
    fn local_branches(&mut self) -> Result<Vec<String>>;

    /// Switch to an existing local branch.
    fn checkout(&mut self, branch: &str) -> Result<()>;

    /// Create a branch at HEAD and switch to it.
    fn checkout_new(&mut self, branch: &str) -> Result<()>;

    /// Whether any stash entries exist.
    fn has_stash(&mut self) -> Result<bool>;

    /// Restore the most recent stash entry.
    fn stash_pop(&mut self) -> Result<()>;
}
