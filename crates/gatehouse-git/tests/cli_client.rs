use tempfile::TempDir;

use gatehouse_git::{CliGit, GitClient, Oid};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(dir: &std::path::Path, args: &[&str]) -> String {
    let out = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn setup_repo() -> (TempDir, CliGit) {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-b", "main", "."]);
    git(dir.path(), &["config", "user.email", "test@test.com"]);
    git(dir.path(), &["config", "user.name", "Test User"]);
    let client = CliGit::new(dir.path());
    (dir, client)
}

fn commit_file(dir: &std::path::Path, name: &str, message: &str) -> Oid {
    std::fs::write(dir.join(name), message).unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", message]);
    git(dir, &["rev-parse", "HEAD"]).parse().unwrap()
}

// ---------------------------------------------------------------------------
// rev-list
// ---------------------------------------------------------------------------

#[test]
fn rev_list_between_returns_new_commits_newest_first() {
    let (dir, client) = setup_repo();
    let base = commit_file(dir.path(), "a.txt", "first");
    let mid = commit_file(dir.path(), "b.txt", "second");
    let tip = commit_file(dir.path(), "c.txt", "third");

    let commits = client.rev_list_between(base, tip).unwrap();
    assert_eq!(commits, vec![tip, mid]);
}

#[test]
fn rev_list_between_empty_when_no_new_commits() {
    let (dir, client) = setup_repo();
    let tip = commit_file(dir.path(), "a.txt", "first");
    let commits = client.rev_list_between(tip, tip).unwrap();
    assert!(commits.is_empty());
}

#[test]
fn rev_list_new_commits_excludes_existing_refs() {
    let (dir, client) = setup_repo();
    let base = commit_file(dir.path(), "a.txt", "on main");
    git(dir.path(), &["checkout", "-b", "feature"]);
    let feature_tip = commit_file(dir.path(), "b.txt", "on feature");

    let commits = client.rev_list_new_commits(feature_tip).unwrap();
    // `feature` already points at the tip, so nothing is new.
    assert!(commits.is_empty());

    // Detach the branch so the tip is only reachable from the pushed OID.
    git(dir.path(), &["checkout", "main"]);
    git(dir.path(), &["branch", "-D", "feature"]);
    let commits = client.rev_list_new_commits(feature_tip).unwrap();
    assert_eq!(commits, vec![feature_tip]);
    assert!(!commits.contains(&base));
}

#[test]
fn rev_list_unknown_oid_fails() {
    let (_dir, client) = setup_repo();
    let missing: Oid = "1234567890123456789012345678901234567890".parse().unwrap();
    assert!(client.rev_list_new_commits(missing).is_err());
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_format_renders_subject_and_author() {
    let (dir, client) = setup_repo();
    let tip = commit_file(dir.path(), "a.txt", "subject line here");

    assert_eq!(
        client.show_format(tip, "%s").unwrap(),
        "subject line here"
    );
    assert_eq!(client.show_format(tip, "%an").unwrap(), "Test User");
}

#[test]
fn show_format_full_message_keeps_interior_newlines() {
    let (dir, client) = setup_repo();
    std::fs::write(dir.path().join("a.txt"), "x").unwrap();
    git(dir.path(), &["add", "."]);
    git(
        dir.path(),
        &["commit", "-m", "subject", "-m", "body paragraph"],
    );
    let tip: Oid = git(dir.path(), &["rev-parse", "HEAD"]).parse().unwrap();

    let message = client.show_format(tip, "%B").unwrap();
    assert!(message.starts_with("subject\n"));
    assert!(message.contains("body paragraph"));
    assert!(!message.ends_with('\n'));
}

// ---------------------------------------------------------------------------
// identity
// ---------------------------------------------------------------------------

#[test]
fn project_name_of_work_tree_repo() {
    let parent = TempDir::new().unwrap();
    let repo_dir = parent.path().join("widget");
    std::fs::create_dir(&repo_dir).unwrap();
    git(&repo_dir, &["init", "-b", "main", "."]);

    let client = CliGit::new(repo_dir.join(".git"));
    assert_eq!(client.project_name().unwrap(), "widget");
}

#[test]
fn project_name_of_bare_repo() {
    let parent = TempDir::new().unwrap();
    let repo_dir = parent.path().join("widget.git");
    std::fs::create_dir(&repo_dir).unwrap();
    git(&repo_dir, &["init", "--bare", "."]);

    let client = CliGit::new(&repo_dir);
    assert_eq!(client.project_name().unwrap(), "widget");
}
