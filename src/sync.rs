//! Conflict-safe pull/push against `origin`.
//!
//! Pull failures arrive from the backend already classified ([PullFailure])
//! and are mapped here onto workflow outcomes: an authentication rejection
//! becomes a fatal, actionable SSH error carrying the host's key-setup
//! links; a branch missing on the remote is informational and the workflow
//! proceeds without that branch's history; anything else terminates the
//! run. Push failures propagate as-is.

use crate::error::{Result, ShipError};
use crate::git::{GitOps, PullFailure};
use crate::host::RemoteHost;
use crate::ui;

/// Non-fatal outcomes of a pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullResult {
    /// History merged (or already up to date)
    Completed,
    /// The remote has no such branch; skipped
    RemoteBranchAbsent,
}

/// Pull `branch` from `origin` into the current HEAD.
pub fn pull(
    git: &mut dyn GitOps,
    host: &dyn RemoteHost,
    branch: &str,
    allow_unrelated: bool,
) -> Result<PullResult> {
    match git.pull("origin", branch, allow_unrelated) {
        Ok(()) => Ok(PullResult::Completed),
        Err(PullFailure::AuthRejected) => Err(ShipError::SshKeyMissing {
            keys_url: host.ssh_keys_url().to_string(),
            help_url: host.ssh_keys_help_url().to_string(),
        }),
        Err(PullFailure::RemoteBranchMissing(name)) => {
            ui::display_status(&format!(
                "Remote has no branch '{}' yet, continuing without its history",
                name
            ));
            Ok(PullResult::RemoteBranchAbsent)
        }
        Err(PullFailure::Other(message)) => {
            ui::display_error(&format!("Pull of '{}' failed: {}", branch, message));
            Err(ShipError::UnclassifiedSyncFailure(message))
        }
    }
}

/// Push `branch` to `origin`.
pub fn push(git: &mut dyn GitOps, branch: &str) -> Result<()> {
    git.push("origin", branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::host::MockHost;

    fn failing_git(branch: &str, failure: PullFailure) -> MockGit {
        let git = MockGit::new();
        git.state()
            .borrow_mut()
            .pull_failures
            .insert(branch.to_string(), failure);
        git
    }

    #[test]
    fn test_successful_pull_completes() {
        let mut git = MockGit::new();
        let host = MockHost::with_user("octocat");

        let result = pull(&mut git, &host, "master", false).unwrap();
        assert_eq!(result, PullResult::Completed);
        assert_eq!(git.state().borrow().log, vec!["pull origin master"]);
    }

    #[test]
    fn test_auth_rejection_maps_to_ssh_remediation() {
        let mut git = failing_git("master", PullFailure::AuthRejected);
        let host = MockHost::with_user("octocat");

        let err = pull(&mut git, &host, "master", false).unwrap_err();
        match err {
            ShipError::SshKeyMissing { keys_url, help_url } => {
                assert_eq!(keys_url, "https://mock.example/keys");
                assert_eq!(help_url, "https://mock.example/keys/help");
            }
            other => panic!("expected SshKeyMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_remote_branch_is_non_fatal() {
        let mut git = failing_git(
            "dev/0.1.0",
            PullFailure::RemoteBranchMissing("dev/0.1.0".to_string()),
        );
        let host = MockHost::with_user("octocat");

        let result = pull(&mut git, &host, "dev/0.1.0", false).unwrap();
        assert_eq!(result, PullResult::RemoteBranchAbsent);
    }

    #[test]
    fn test_other_failures_terminate() {
        let mut git = failing_git("master", PullFailure::Other("network down".to_string()));
        let host = MockHost::with_user("octocat");

        let err = pull(&mut git, &host, "master", false).unwrap_err();
        match err {
            ShipError::UnclassifiedSyncFailure(message) => {
                assert_eq!(message, "network down");
            }
            other => panic!("expected UnclassifiedSyncFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_push_goes_to_origin() {
        let mut git = MockGit::new();
        push(&mut git, "dev/0.1.0").unwrap();
        assert_eq!(git.state().borrow().log, vec!["push origin dev/0.1.0"]);
    }
}
