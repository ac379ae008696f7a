use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Direction, ErrorClass, ErrorCode, FetchOptions, IndexAddOption, MergeOptions,
    PushOptions, RemoteCallbacks, Repository, StatusOptions,
};

use crate::error::{Result, ShipError};
use crate::git::{GitOps, PullFailure, StatusSummary};

/// git2-backed implementation of [GitOps] for one project directory.
///
/// The directory may start without a repository; `init` creates one and the
/// backend picks it up. SSH authentication tries key files under `~/.ssh`
/// and falls back to the agent.
pub struct Git2Backend {
    dir: PathBuf,
    repo: Option<Repository>,
}

impl Git2Backend {
    /// Bind to a project directory, opening the repository if one exists.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let repo = Repository::open(&dir).ok();
        Git2Backend { dir, repo }
    }

    fn repo(&self) -> Result<&Repository> {
        self.repo
            .as_ref()
            .ok_or_else(|| ShipError::Git(git2::Error::from_str("repository is not initialized")))
    }

    fn repo_mut(&mut self) -> Result<&mut Repository> {
        self.repo
            .as_mut()
            .ok_or_else(|| ShipError::Git(git2::Error::from_str("repository is not initialized")))
    }

    /// Credentials callback chain: SSH key files in order of preference,
    /// then the SSH agent, then libgit2's default.
    fn remote_callbacks() -> RemoteCallbacks<'static> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                let key_paths = vec![
                    format!("{}/.ssh/id_ed25519", home),
                    format!("{}/.ssh/id_rsa", home),
                    format!("{}/.ssh/id_ecdsa", home),
                ];

                for key_path in key_paths {
                    let path = Path::new(&key_path);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(
                            username_from_url.unwrap_or("git"),
                            None,
                            path,
                            None,
                        ) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) =
                    git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });
        callbacks
    }

    /// Map a git2 error to the structured sync failure. Classification is
    /// on error class and code, never on message text.
    fn classify(branch: &str, err: git2::Error) -> PullFailure {
        if err.class() == ErrorClass::Ssh || err.code() == ErrorCode::Auth {
            PullFailure::AuthRejected
        } else if err.code() == ErrorCode::NotFound && err.class() != ErrorClass::Config {
            // A NotFound from configuration means the remote itself is
            // missing, not the branch.
            PullFailure::RemoteBranchMissing(branch.to_string())
        } else {
            PullFailure::Other(err.message().to_string())
        }
    }

    fn do_pull(
        &mut self,
        remote_name: &str,
        branch: &str,
        allow_unrelated: bool,
    ) -> std::result::Result<(), git2::Error> {
        let repo = self
            .repo
            .as_ref()
            .ok_or_else(|| git2::Error::from_str("repository is not initialized"))?;

        let mut remote = repo.find_remote(remote_name)?;
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(Self::remote_callbacks());

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, remote_name);
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None)?;

        // The server may silently skip a refspec whose source does not
        // exist, so the tracking ref is the authoritative existence check.
        let tracking = format!("refs/remotes/{}/{}", remote_name, branch);
        let remote_ref = repo.find_reference(&tracking)?;
        let annotated = repo.reference_to_annotated_commit(&remote_ref)?;

        let (analysis, _) = repo.merge_analysis(&[&annotated])?;
        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_unborn() {
            // Nothing committed locally yet: point the current branch at
            // the fetched commit.
            let refname = repo
                .find_reference("HEAD")?
                .symbolic_target()
                .unwrap_or("refs/heads/master")
                .to_string();
            repo.reference(&refname, annotated.id(), true, "pull: initial")?;
            repo.set_head(&refname)?;
            repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
            return Ok(());
        }

        if analysis.is_fast_forward() {
            let mut head_ref = repo.head()?;
            head_ref.set_target(annotated.id(), "pull: fast-forward")?;
            repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
            return Ok(());
        }

        let head_commit = repo.head()?.peel_to_commit()?;
        let their_commit = repo.find_commit(annotated.id())?;

        if !allow_unrelated && repo.merge_base(head_commit.id(), their_commit.id()).is_err() {
            return Err(git2::Error::from_str(&format!(
                "refusing to merge unrelated histories from '{}'",
                branch
            )));
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.allow_conflicts(true).conflict_style_merge(true);
        repo.merge(
            &[&annotated],
            Some(&mut MergeOptions::new()),
            Some(&mut checkout),
        )?;

        let mut index = repo.index()?;
        if index.has_conflicts() {
            // Leave the conflict markers in place; the conflict guard
            // reports them and the workflow halts.
            return Ok(());
        }

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = repo.signature()?;
        let message = format!("Merge branch '{}' of {}", branch, remote_name);
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &message,
            &tree,
            &[&head_commit, &their_commit],
        )?;
        repo.cleanup_state()?;

        Ok(())
    }
}

impl GitOps for Git2Backend {
    fn is_initialized(&self) -> bool {
        self.repo.is_some()
    }

    fn init(&mut self) -> Result<()> {
        // The workflow's mainline is always `master`, regardless of any
        // local init.defaultBranch setting.
        let mut options = git2::RepositoryInitOptions::new();
        options.initial_head("master");
        let repo = Repository::init_opts(&self.dir, &options)?;
        self.repo = Some(repo);
        Ok(())
    }

    fn status(&mut self) -> Result<StatusSummary> {
        let repo = self.repo()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = repo.statuses(Some(&mut options))?;
        let mut summary = StatusSummary::default();

        for entry in statuses.iter() {
            let path = match entry.path() {
                Some(path) => path.to_string(),
                None => continue,
            };
            let status = entry.status();

            if status.is_conflicted() {
                summary.conflicted.push(path);
            } else if status.contains(git2::Status::WT_NEW) {
                summary.not_added.push(path);
            } else if status.contains(git2::Status::INDEX_NEW) {
                summary.created.push(path);
            } else if status.contains(git2::Status::WT_DELETED)
                || status.contains(git2::Status::INDEX_DELETED)
            {
                summary.deleted.push(path);
            } else if status.contains(git2::Status::WT_RENAMED)
                || status.contains(git2::Status::INDEX_RENAMED)
            {
                summary.renamed.push(path);
            } else if status.contains(git2::Status::WT_MODIFIED)
                || status.contains(git2::Status::INDEX_MODIFIED)
            {
                summary.modified.push(path);
            }
        }

        Ok(summary)
    }

    fn add(&mut self, paths: &[String]) -> Result<()> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        index.add_all(paths.iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(paths.iter(), None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        let repo = self.repo()?;
        let sig = repo.signature()?;
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(())
    }

    fn remotes(&mut self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let names = repo.remotes()?;
        Ok(names.iter().flatten().map(|name| name.to_string()).collect())
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
        let repo = self.repo()?;
        repo.remote(name, url)?;
        Ok(())
    }

    fn pull(
        &mut self,
        remote: &str,
        branch: &str,
        allow_unrelated: bool,
    ) -> std::result::Result<(), PullFailure> {
        self.do_pull(remote, branch, allow_unrelated)
            .map_err(|e| Self::classify(branch, e))
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(remote)?;

        let mut callbacks = Self::remote_callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                Err(git2::Error::from_str(&format!(
                    "push rejected for {}: {}",
                    refname, status
                )))
            } else {
                Ok(())
            }
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        Ok(())
    }

    fn list_remote_refs(&mut self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote("origin")?;
        let connection =
            remote.connect_auth(Direction::Fetch, Some(Self::remote_callbacks()), None)?;
        let refs = connection
            .list()?
            .iter()
            .map(|head| head.name().to_string())
            .collect();
        Ok(refs)
    }

    fn local_branches(&mut self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let mut names = Vec::new();
        for branch in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn checkout(&mut self, branch: &str) -> Result<()> {
        let repo = self.repo()?;
        let (object, reference) = repo.revparse_ext(branch)?;
        repo.checkout_tree(&object, None)?;
        match reference.and_then(|r| r.name().map(|n| n.to_string())) {
            Some(name) => repo.set_head(&name)?,
            None => repo.set_head_detached(object.id())?,
        }
        Ok(())
    }

    fn checkout_new(&mut self, branch: &str) -> Result<()> {
        let repo = self.repo()?;
        let head_commit = repo.head()?.peel_to_commit()?;
        repo.branch(branch, &head_commit, false)?;
        repo.set_head(&format!("refs/heads/{}", branch))?;
        Ok(())
    }

    fn has_stash(&mut self) -> Result<bool> {
        let repo = self.repo_mut()?;
        let mut count = 0;
        repo.stash_foreach(|_, _, _| {
            count += 1;
            true
        })?;
        Ok(count > 0)
    }

    fn stash_pop(&mut self) -> Result<()> {
        let repo = self.repo_mut()?;
        repo.stash_pop(0, None)?;
        Ok(())
    }
}
