//! Remote hosting platform abstraction.
//!
//! The [RemoteHost] trait covers everything the workflow needs from a
//! hosting platform: identity resolution, repository lookup/creation and
//! credential-setup help URLs. Two concrete clients exist, [GithubClient]
//! and [GiteeClient]; the variant is selected once when the cached or
//! prompted platform choice is resolved, and everything downstream works
//! against the trait.

pub mod gitee;
pub mod github;
pub mod mock;

use serde::Deserialize;

pub use gitee::GiteeClient;
pub use github::GithubClient;
pub use mock::MockHost;

use crate::error::Result;

/// A user or organization account on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
}

/// A repository as reported by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRepo {
    pub full_name: String,
    pub ssh_url: String,
}

/// Supported hosting platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Github,
    Gitee,
}

impl HostKind {
    pub const ALL: [HostKind; 2] = [HostKind::Github, HostKind::Gitee];

    /// Stable cache value for this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Github => "github",
            HostKind::Gitee => "gitee",
        }
    }

    /// Human-readable label for choice lists.
    pub fn label(&self) -> &'static str {
        match self {
            HostKind::Github => "GitHub",
            HostKind::Gitee => "Gitee",
        }
    }

    /// Parse a cached platform value. Unknown values read as absent.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "github" => Some(HostKind::Github),
            "gitee" => Some(HostKind::Gitee),
            _ => None,
        }
    }
}

/// Build the concrete client for a platform choice.
pub fn client_for(kind: HostKind) -> Result<Box<dyn RemoteHost>> {
    Ok(match kind {
        HostKind::Github => Box::new(GithubClient::new()?),
        HostKind::Gitee => Box::new(GiteeClient::new()?),
    })
}

/// Operations the workflow engine consumes from a hosting platform.
///
/// `get_user` returning `None` after a token has been bound means the
/// token resolves no identity, which the engine treats as fatal. Creation
/// operations return `None` when the platform rejected the request.
pub trait RemoteHost {
    /// Bind the access token used for subsequent calls.
    fn set_token(&mut self, token: &str);

    /// Resolve the authenticated user.
    fn get_user(&self) -> Result<Option<Identity>>;

    /// List organizations the authenticated user belongs to.
    fn get_orgs(&self) -> Result<Vec<Identity>>;

    /// Look up a repository under an account. `None` means it does not exist.
    fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepo>>;

    /// Create a repository under the authenticated user.
    fn create_repo(&self, name: &str) -> Result<Option<RemoteRepo>>;

    /// Create a repository under an organization.
    fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepo>>;

    /// SSH remote URL for a repository under an account.
    fn remote_url(&self, login: &str, name: &str) -> String;

    /// Where to create a personal access token.
    fn token_help_url(&self) -> &str;

    /// Where to register SSH keys.
    fn ssh_keys_url(&self) -> &str;

    /// Documentation for SSH key setup.
    fn ssh_keys_help_url(&self) -> &str;
}
