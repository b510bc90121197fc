use hh_c2t::collector::{Collector, GitCollector};
use hh_c2t::errors::CollectError;
use hh_c2t::filter::FileFilter;
use std::path::Path;
use tempfile::tempdir;
use tokio::fs;
use tokio::process::Command;

async fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=hh-c2t", "-c", "user.email=hh-c2t@example.com"])
        .args(args)
        .current_dir(repo)
        .status()
        .await
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed with status: {:?}", args, status);
}

async fn assert_empty(dir: &Path) {
    let mut entries = fs::read_dir(dir).await.unwrap();
    assert!(
        entries.next_entry().await.unwrap().is_none(),
        "checkout directory was left behind in {}",
        dir.display()
    );
}

#[tokio::test]
async fn test_collect_from_local_repository() {
    let repo_dir = tempdir().unwrap();
    let repo_path = repo_dir.path();
    git(repo_path, &["init", "."]).await;

    fs::create_dir_all(repo_path.join("pkg")).await.unwrap();
    fs::write(repo_path.join("a.py"), "print('a')").await.unwrap();
    fs::write(repo_path.join("pkg/b.py"), "print('b')").await.unwrap();
    fs::write(repo_path.join("notes.txt"), "skip me").await.unwrap();
    git(repo_path, &["add", "."]).await;
    git(repo_path, &["commit", "-m", "Initial commit"]).await;

    let checkouts = tempdir().unwrap();
    let git_url = format!("file://{}", repo_path.to_string_lossy());
    let document = GitCollector::new(git_url)
        .with_checkout_parent(checkouts.path())
        .collect(&FileFilter::default())
        .await
        .unwrap_or_else(|e| panic!("Git collection failed: {:?}", e));

    assert_eq!(
        document.render(),
        "```a.py\nprint('a')\n```\n\n```pkg/b.py\nprint('b')\n```\n\n"
    );
    assert_empty(checkouts.path()).await;
}

#[tokio::test]
async fn test_failed_clone_removes_checkout() {
    let checkouts = tempdir().unwrap();
    let missing = checkouts.path().join("no-such-repo");
    let git_url = format!("file://{}", missing.to_string_lossy());

    let result = GitCollector::new(git_url)
        .with_checkout_parent(checkouts.path())
        .collect(&FileFilter::default())
        .await;

    assert!(matches!(result, Err(CollectError::CloneError(_))));
    assert_empty(checkouts.path()).await;
}
