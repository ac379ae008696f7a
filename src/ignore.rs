use std::fs;
use std::path::Path;

use crate::error::Result;

/// Default ignore patterns written when a project has no `.gitignore`.
/// Fixed and non-configurable.
pub const DEFAULT_IGNORE: &str = "\
# build output
node_modules/
dist/
build/
target/

# OS and editor metadata
.DS_Store
Thumbs.db
.idea/
.vscode/
*.swp

# environment
.env
.env.local

# logs
*.log
logs/
";

/// Ensure an ignore file exists at the project root.
///
/// Writes [DEFAULT_IGNORE] when `.gitignore` is absent. Returns `true` if
/// the file was written, `false` if one already existed.
pub fn ensure_ignore_file(dir: &Path) -> Result<bool> {
    let path = dir.join(".gitignore");
    if path.exists() {
        return Ok(false);
    }

    fs::write(&path, DEFAULT_IGNORE)?;
    Ok(true)
}
