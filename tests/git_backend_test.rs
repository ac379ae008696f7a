//! Git2Backend tests against real on-disk repositories.
//!
//! A bare repository on the local filesystem stands in for the hosted
//! remote, so push/pull/ls-remote run over the local transport with no
//! network or credentials involved.

use std::fs;
use std::path::Path;

use git2::Repository;
use tempfile::TempDir;

use git_ship::git::{Git2Backend, GitOps, PullFailure};

fn configure_user(path: &Path) {
    let repo = Repository::open(path).expect("Could not open repo");
    let mut config = repo.config().expect("Could not get config");
    config
        .set_str("user.name", "Test User")
        .expect("Could not set user.name");
    config
        .set_str("user.email", "test@example.com")
        .expect("Could not set user.email");
}

fn init_project(dir: &TempDir) -> Git2Backend {
    let mut backend = Git2Backend::open(dir.path());
    assert!(!backend.is_initialized());
    backend.init().unwrap();
    assert!(backend.is_initialized());
    configure_user(dir.path());
    backend
}

#[test]
fn test_status_add_commit_cycle() {
    let dir = TempDir::new().unwrap();
    let mut backend = init_project(&dir);

    fs::write(dir.path().join("index.html"), "<html></html>\n").unwrap();

    let status = backend.status().unwrap();
    assert_eq!(status.not_added, vec!["index.html"]);
    assert!(!status.is_clean());

    backend.add(&["index.html".to_string()]).unwrap();
    let status = backend.status().unwrap();
    assert_eq!(status.created, vec!["index.html"]);

    backend.commit("initial").unwrap();
    assert!(backend.status().unwrap().is_clean());

    // Modifications and deletions are reported in their own buckets
    fs::write(dir.path().join("index.html"), "<html>v2</html>\n").unwrap();
    let status = backend.status().unwrap();
    assert_eq!(status.modified, vec!["index.html"]);

    backend.add(&["index.html".to_string()]).unwrap();
    backend.commit("update").unwrap();

    fs::remove_file(dir.path().join("index.html")).unwrap();
    let status = backend.status().unwrap();
    assert_eq!(status.deleted, vec!["index.html"]);
}

#[test]
fn test_branch_creation_and_checkout() {
    let dir = TempDir::new().unwrap();
    let mut backend = init_project(&dir);

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    backend.add(&["a.txt".to_string()]).unwrap();
    backend.commit("initial").unwrap();

    assert_eq!(backend.local_branches().unwrap(), vec!["master"]);

    backend.checkout_new("dev/0.1.0").unwrap();
    let branches = backend.local_branches().unwrap();
    assert!(branches.contains(&"dev/0.1.0".to_string()));

    backend.checkout("master").unwrap();
    backend.checkout("dev/0.1.0").unwrap();
}

#[test]
fn test_remote_registration_push_and_ls_remote() {
    let remote_dir = TempDir::new().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let mut backend = init_project(&dir);

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    backend.add(&["a.txt".to_string()]).unwrap();
    backend.commit("initial").unwrap();

    assert!(backend.remotes().unwrap().is_empty());
    backend
        .add_remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();
    assert_eq!(backend.remotes().unwrap(), vec!["origin"]);

    backend.push("origin", "master").unwrap();

    let bare = Repository::open_bare(remote_dir.path()).unwrap();
    assert!(bare.find_reference("refs/heads/master").is_ok());

    let refs = backend.list_remote_refs().unwrap();
    assert!(refs.contains(&"refs/heads/master".to_string()));
}

#[test]
fn test_pull_classifies_missing_remote_branch() {
    let remote_dir = TempDir::new().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let mut backend = init_project(&dir);

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    backend.add(&["a.txt".to_string()]).unwrap();
    backend.commit("initial").unwrap();
    backend
        .add_remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();
    backend.push("origin", "master").unwrap();

    let result = backend.pull("origin", "dev/9.9.9", false);
    assert_eq!(
        result,
        Err(PullFailure::RemoteBranchMissing("dev/9.9.9".to_string()))
    );

    // Pulling a branch we just pushed is an up-to-date no-op
    assert_eq!(backend.pull("origin", "master", false), Ok(()));
}

#[test]
fn test_pull_fast_forwards_behind_branch() {
    let remote_dir = TempDir::new().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();

    // First workdir publishes two commits
    let first = TempDir::new().unwrap();
    let mut publisher = init_project(&first);
    fs::write(first.path().join("a.txt"), "a\n").unwrap();
    publisher.add(&["a.txt".to_string()]).unwrap();
    publisher.commit("one").unwrap();
    publisher
        .add_remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();
    publisher.push("origin", "master").unwrap();

    // Second workdir starts from the first commit
    let second = TempDir::new().unwrap();
    let mut follower = init_project(&second);
    follower
        .add_remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();
    assert_eq!(follower.pull("origin", "master", false), Ok(()));
    assert!(second.path().join("a.txt").is_file());

    // Publisher moves ahead; follower fast-forwards
    fs::write(first.path().join("b.txt"), "b\n").unwrap();
    publisher.add(&["b.txt".to_string()]).unwrap();
    publisher.commit("two").unwrap();
    publisher.push("origin", "master").unwrap();

    assert_eq!(follower.pull("origin", "master", false), Ok(()));
    assert!(second.path().join("b.txt").is_file());
}

#[test]
fn test_stash_pop_restores_changes() {
    let dir = TempDir::new().unwrap();
    let mut backend = init_project(&dir);

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    backend.add(&["a.txt".to_string()]).unwrap();
    backend.commit("initial").unwrap();

    assert!(!backend.has_stash().unwrap());

    // Stash a modification through a second handle on the same repo
    fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
    {
        let mut repo = Repository::open(dir.path()).unwrap();
        let sig = repo.signature().unwrap();
        repo.stash_save(&sig, "wip", None).unwrap();
    }
    assert_eq!(
        fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "a\n"
    );

    assert!(backend.has_stash().unwrap());
    backend.stash_pop().unwrap();
    assert!(!backend.has_stash().unwrap());
    assert_eq!(
        fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "changed\n"
    );
}
