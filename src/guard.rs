//! Working-tree preconditions checked before any synchronization.

use crate::error::{Result, ShipError};
use crate::git::GitOps;
use crate::prompt::Prompt;
use crate::ui;

/// Fail fast on unresolved merge conflicts. The workflow never attempts
/// automatic resolution.
pub fn check_conflicted(git: &mut dyn GitOps) -> Result<()> {
    let status = git.status()?;
    if status.conflicted.is_empty() {
        Ok(())
    } else {
        Err(ShipError::UnresolvedConflict {
            paths: status.conflicted,
        })
    }
}

/// Stage and commit any pending changes.
///
/// Prompts repeatedly for a commit message until a non-empty one is given.
/// No-op on a clean tree. Returns whether a commit was made.
pub fn check_not_committed(git: &mut dyn GitOps, prompt: &dyn Prompt) -> Result<bool> {
    let status = git.status()?;
    let pending = status.pending_paths();
    if pending.is_empty() {
        return Ok(false);
    }

    ui::display_status(&format!("{} change(s) to commit", pending.len()));
    git.add(&pending)?;

    let message = loop {
        let entered = prompt.input("Commit message", None)?;
        let entered = entered.trim().to_string();
        if !entered.is_empty() {
            break entered;
        }
        ui::display_warning("Commit message cannot be empty");
    };

    git.commit(&message)?;
    ui::display_success(&format!("Committed: {}", message));
    Ok(true)
}
