//! Versioned branch naming and remote ref discovery.
//!
//! Working branches are named `{channel}/{version}` where the channel is
//! `release` or `dev` (the default) and the version must be a well-formed
//! semantic version. Discovery scans the remote's advertised refs for
//! versions already published on a channel.

use regex::Regex;
use semver::Version;

use crate::context::RepositoryContext;
use crate::error::{Result, ShipError};
use crate::git::GitOps;
use crate::ui;

/// Release channel a working branch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    Release,
    #[default]
    Dev,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Release => "release",
            Channel::Dev => "dev",
        }
    }

    /// Pattern matching this channel's versioned refs on the remote.
    /// Release versions live under tags, dev versions under branch heads.
    fn ref_pattern(&self) -> Regex {
        let pattern = match self {
            Channel::Release => r"^refs/tags/release/(.+)$",
            Channel::Dev => r"^refs/heads/dev/(.+)$",
        };
        Regex::new(pattern).expect("ref pattern is valid")
    }
}

/// Compose the canonical branch name for a channel and version.
///
/// The version must parse as a semantic version; anything else is rejected
/// before a branch is ever named after it.
pub fn branch_name(channel: Channel, version: &str) -> Result<String> {
    Version::parse(version).map_err(|e| {
        ShipError::version(format!("'{}' is not a semantic version: {}", version, e))
    })?;
    Ok(format!("{}/{}", channel.as_str(), version))
}

/// Extract the versions already published on a channel from a remote ref
/// listing. Tokens that do not parse as semantic versions are discarded.
pub fn scan_remote_versions(refs: &[String], channel: Channel) -> Vec<Version> {
    let pattern = channel.ref_pattern();
    let mut versions: Vec<Version> = refs
        .iter()
        .filter_map(|name| pattern.captures(name))
        .filter_map(|captures| Version::parse(&captures[1]).ok())
        .collect();
    versions.sort();
    versions
}

/// Resolve the working branch for the context's version on a channel.
///
/// Queries the remote for versions already published on the channel and
/// reports them, but the branch always uses the literal project version;
/// the published list never adjusts the target.
pub fn resolve_version(
    git: &mut dyn GitOps,
    ctx: &mut RepositoryContext,
    channel: Channel,
) -> Result<()> {
    let refs = git.list_remote_refs()?;
    let published = scan_remote_versions(&refs, channel);
    if let Some(latest) = published.last() {
        ui::display_status(&format!(
            "{} version(s) already on the {} channel, latest {}",
            published.len(),
            channel.as_str(),
            latest
        ));
    }

    ctx.branch = branch_name(channel, &ctx.version)?;
    ui::display_status(&format!("Working branch: {}", ctx.branch));
    Ok(())
}

/// Switch to the resolved branch, creating it locally if it does not exist.
pub fn checkout_branch(git: &mut dyn GitOps, ctx: &RepositoryContext) -> Result<()> {
    let exists = git.local_branches()?.iter().any(|name| name == &ctx.branch);
    if exists {
        git.checkout(&ctx.branch)
    } else {
        git.checkout_new(&ctx.branch)
    }
}

/// Restore the most recent stash entry, if any exists.
pub fn check_stash(git: &mut dyn GitOps) -> Result<()> {
    if git.has_stash()? {
        ui::display_status("Restoring stashed changes");
        git.stash_pop()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;

    #[test]
    fn test_release_branch_name() {
        assert_eq!(
            branch_name(Channel::Release, "1.2.3").unwrap(),
            "release/1.2.3"
        );
    }

    #[test]
    fn test_default_channel_branch_name() {
        assert_eq!(
            branch_name(Channel::default(), "0.1.0").unwrap(),
            "dev/0.1.0"
        );
    }

    #[test]
    fn test_invalid_version_is_rejected() {
        assert!(branch_name(Channel::Dev, "1.2").is_err());
        assert!(branch_name(Channel::Release, "x.y.z").is_err());
        assert!(branch_name(Channel::Dev, "").is_err());
    }

    #[test]
    fn test_scan_discards_invalid_versions() {
        let refs = vec![
            "refs/heads/dev/1.0.0".to_string(),
            "refs/heads/dev/x.y.z".to_string(),
        ];
        let versions = scan_remote_versions(&refs, Channel::Dev);
        assert_eq!(versions, vec![Version::parse("1.0.0").unwrap()]);
    }

    #[test]
    fn test_scan_matches_channel_specific_refs() {
        let refs = vec![
            "refs/heads/master".to_string(),
            "refs/heads/dev/0.2.0".to_string(),
            "refs/tags/release/1.0.0".to_string(),
            "refs/tags/v2".to_string(),
        ];

        let dev = scan_remote_versions(&refs, Channel::Dev);
        assert_eq!(dev, vec![Version::parse("0.2.0").unwrap()]);

        let release = scan_remote_versions(&refs, Channel::Release);
        assert_eq!(release, vec![Version::parse("1.0.0").unwrap()]);
    }

    #[test]
    fn test_scan_results_are_sorted() {
        let refs = vec![
            "refs/heads/dev/0.10.0".to_string(),
            "refs/heads/dev/0.2.0".to_string(),
        ];
        let versions = scan_remote_versions(&refs, Channel::Dev);
        assert_eq!(versions[0], Version::parse("0.2.0").unwrap());
        assert_eq!(versions[1], Version::parse("0.10.0").unwrap());
    }

    #[test]
    fn test_resolve_version_keeps_literal_version() {
        let mut git = MockGit::new();
        git.state()
            .borrow_mut()
            .remote_refs
            .push("refs/heads/dev/9.9.9".to_string());

        let mut ctx = RepositoryContext::new("/tmp/site");
        ctx.version = "0.1.0".to_string();

        resolve_version(&mut git, &mut ctx, Channel::Dev).unwrap();
        // Published 9.9.9 is reported but never adopted
        assert_eq!(ctx.branch, "dev/0.1.0");
    }

    #[test]
    fn test_checkout_existing_vs_new_branch() {
        let mut git = MockGit::new();
        git.state()
            .borrow_mut()
            .local_branches
            .push("dev/0.1.0".to_string());

        let mut ctx = RepositoryContext::new("/tmp/site");
        ctx.branch = "dev/0.1.0".to_string();
        checkout_branch(&mut git, &ctx).unwrap();

        ctx.branch = "dev/0.2.0".to_string();
        checkout_branch(&mut git, &ctx).unwrap();

        let state = git.state();
        let log = state.borrow().log.clone();
        assert_eq!(log, vec!["checkout dev/0.1.0", "checkout -b dev/0.2.0"]);
    }

    #[test]
    fn test_check_stash_pops_only_when_present() {
        let mut git = MockGit::new();
        check_stash(&mut git).unwrap();
        assert!(git.state().borrow().log.is_empty());

        git.state().borrow_mut().stash_count = 1;
        check_stash(&mut git).unwrap();
        assert_eq!(git.state().borrow().log, vec!["stash pop"]);
    }
}
