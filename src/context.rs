use std::path::{Path, PathBuf};

/// Which kind of account owns the remote repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerKind {
    #[default]
    Personal,
    Organization,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Personal => "personal",
            OwnerKind::Organization => "organization",
        }
    }

    /// Parse a cached owner-kind value. Unknown values read as absent.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(OwnerKind::Personal),
            "organization" => Some(OwnerKind::Organization),
            _ => None,
        }
    }
}

/// Mutable workflow state threaded through every operation.
///
/// Created once per invocation and filled in as resolution steps complete.
/// Never persisted directly; resolved pieces are cached individually through
/// [crate::cache::CredentialStore].
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryContext {
    /// Local project directory
    pub dir: PathBuf,
    /// Repository name, derived from the directory unless overridden
    pub name: String,
    /// Semantic version string for the current release
    pub version: String,
    /// Resolved working branch (`{channel}/{version}`)
    pub branch: String,
    /// Resolved remote URL for `origin`
    pub remote_url: String,
    /// Which kind of account owns the remote repository
    pub owner: OwnerKind,
    /// Resolved account login the repository lives under
    pub login: String,
}

impl RepositoryContext {
    /// Create a context for a project directory. The repository name is the
    /// directory's base name.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = repo_name_from_dir(&dir);

        RepositoryContext {
            dir,
            name,
            version: String::new(),
            branch: String::new(),
            remote_url: String::new(),
            owner: OwnerKind::default(),
            login: String::new(),
        }
    }
}

fn repo_name_from_dir(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}
