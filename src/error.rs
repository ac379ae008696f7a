use thiserror::Error;

/// Unified error type for git-ship operations
#[derive(Error, Debug)]
pub enum ShipError {
    #[error("Cache root unavailable: {0}")]
    HomeDirectoryUnavailable(String),

    #[error("The remote host returned no identity for the configured token")]
    IdentityResolutionFailed,

    #[error("Could not create remote repository '{name}' under '{owner}'")]
    RemoteRepoCreationFailed { owner: String, name: String },

    #[error("Unresolved conflicts in the working tree: {}", .paths.join(", "))]
    UnresolvedConflict { paths: Vec<String> },

    #[error("The remote rejected the SSH key. Add one at {keys_url} (help: {help_url})")]
    SshKeyMissing { keys_url: String, help_url: String },

    #[error("Synchronization failed: {0}")]
    UnclassifiedSyncFailure(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Remote host error: {0}")]
    Host(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-ship
pub type Result<T> = std::result::Result<T, ShipError>;

impl ShipError {
    /// Create a cache-root error with context
    pub fn home(msg: impl Into<String>) -> Self {
        ShipError::HomeDirectoryUnavailable(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ShipError::Version(msg.into())
    }

    /// Create a remote host error with context
    pub fn host(msg: impl Into<String>) -> Self {
        ShipError::Host(msg.into())
    }
}
