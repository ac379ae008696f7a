use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::Result;
use crate::git::{GitOps, PullFailure, StatusSummary};

/// Shared inner state of [MockGit]. Tests keep a handle while the workflow
/// owns the boxed backend.
#[derive(Debug, Default)]
pub struct MockGitState {
    pub initialized: bool,
    /// Statuses served in order; once drained, the tree reads as clean.
    pub statuses: VecDeque<StatusSummary>,
    pub remotes: Vec<String>,
    pub remote_refs: Vec<String>,
    pub local_branches: Vec<String>,
    pub stash_count: usize,
    /// Branch name → failure served on pull of that branch.
    pub pull_failures: HashMap<String, PullFailure>,
    /// Commit messages in order.
    pub commits: Vec<String>,
    /// Every operation performed, e.g. `push origin master`.
    pub log: Vec<String>,
}

/// Mock repository for testing without actual git operations
pub struct MockGit {
    state: Rc<RefCell<MockGitState>>,
}

impl MockGit {
    /// Empty, uninitialized mock project.
    pub fn new() -> Self {
        MockGit {
            state: Rc::new(RefCell::new(MockGitState::default())),
        }
    }

    /// Build from pre-assembled state.
    pub fn from_state(state: MockGitState) -> Self {
        MockGit {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Handle onto the shared state for later inspection.
    pub fn state(&self) -> Rc<RefCell<MockGitState>> {
        Rc::clone(&self.state)
    }

    /// A second backend over the same state (the workflow consumes
    /// backends by value).
    pub fn clone_handle(&self) -> Self {
        MockGit {
            state: Rc::clone(&self.state),
        }
    }

    fn record(&self, op: String) {
        self.state.borrow_mut().log.push(op);
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitOps for MockGit {
    fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    fn init(&mut self) -> Result<()> {
        self.record("init".to_string());
        self.state.borrow_mut().initialized = true;
        Ok(())
    }

    fn status(&mut self) -> Result<StatusSummary> {
        let mut state = self.state.borrow_mut();
        Ok(state.statuses.pop_front().unwrap_or_default())
    }

    fn add(&mut self, paths: &[String]) -> Result<()> {
        self.record(format!("add {}", paths.join(" ")));
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        self.record(format!("commit {}", message));
        self.state.borrow_mut().commits.push(message.to_string());
        Ok(())
    }

    fn remotes(&mut self) -> Result<Vec<String>> {
        Ok(self.state.borrow().remotes.clone())
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
        self.record(format!("add-remote {} {}", name, url));
        self.state.borrow_mut().remotes.push(name.to_string());
        Ok(())
    }

    fn pull(
        &mut self,
        remote: &str,
        branch: &str,
        allow_unrelated: bool,
    ) -> std::result::Result<(), PullFailure> {
        self.record(format!(
            "pull {} {}{}",
            remote,
            branch,
            if allow_unrelated { " --allow-unrelated" } else { "" }
        ));
        match self.state.borrow().pull_failures.get(branch) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, branch));
        Ok(())
    }

    fn list_remote_refs(&mut self) -> Result<Vec<String>> {
        Ok(self.state.borrow().remote_refs.clone())
    }

    fn local_branches(&mut self) -> Result<Vec<String>> {
        Ok(self.state.borrow().local_branches.clone())
    }

    fn checkout(&mut self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch));
        Ok(())
    }

    fn checkout_new(&mut self, branch: &str) -> Result<()> {
        self.record(format!("checkout -b {}", branch));
        self.state.borrow_mut().local_branches.push(branch.to_string());
        Ok(())
    }

    fn has_stash(&mut self) -> Result<bool> {
        Ok(self.state.borrow().stash_count > 0)
    }

    fn stash_pop(&mut self) -> Result<()> {
        self.record("stash pop".to_string());
        let mut state = self.state.borrow_mut();
        if state.stash_count > 0 {
            state.stash_count -= 1;
        }
        Ok(())
    }
}
