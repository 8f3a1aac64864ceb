//! Integration tests for the fetch, edit and commit cycle.

use std::sync::Mutex;

use async_trait::async_trait;
use yamlset::driver::{run, DriverError, RunOptions, RunOutcome};
use yamlset::remote::{
    CommitAuthor, CommitRequest, FetchedFile, FileLocation, ObjectStore, StoreError,
};

const CONTENT: &str = "# deployed by CI\napiVersion: v1\nkind: Foo\n";

/// In-memory store holding one file at one commit.
struct MemoryStore {
    file: Option<FetchedFile>,
    commits: Mutex<Vec<CommitRequest>>,
    reject_commit: bool,
}

impl MemoryStore {
    fn with_content(content: &str) -> Self {
        Self {
            file: Some(FetchedFile {
                content: content.to_string(),
                tree_sha: "tree-1".to_string(),
                commit_sha: "commit-1".to_string(),
            }),
            commits: Mutex::new(Vec::new()),
            reject_commit: false,
        }
    }

    fn commits(&self) -> Vec<CommitRequest> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn fetch_file(&self, location: &FileLocation) -> Result<FetchedFile, StoreError> {
        self.file.clone().ok_or_else(|| StoreError::NoCommit {
            branch: location.branch.clone(),
        })
    }

    async fn commit_file(&self, request: &CommitRequest) -> Result<String, StoreError> {
        if self.reject_commit {
            return Err(StoreError::NoTree {
                commit: request.parent.clone(),
            });
        }
        let mut commits = self.commits.lock().unwrap();
        commits.push(request.clone());
        Ok(format!("commit-{}", commits.len() + 1))
    }
}

fn options(locations: &[&str], replacement: &str) -> RunOptions {
    RunOptions {
        location: FileLocation::new("acme", "deploy", "main", "app.yaml"),
        locations: locations.iter().map(|l| l.to_string()).collect(),
        replacement: replacement.to_string(),
        dry_run: false,
        show_diff: false,
        author: CommitAuthor::from_username("octocat"),
        message: "Update app.yaml".to_string(),
        warn_missing: false,
    }
}

#[tokio::test]
async fn test_dry_run_returns_content_without_committing() {
    let store = MemoryStore::with_content(CONTENT);
    let opts = RunOptions {
        dry_run: true,
        ..options(&["kind"], "Bar")
    };

    let outcome = run(&store, &opts).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::DryRun {
            commit_sha: "commit-1".to_string(),
            content: "# deployed by CI\napiVersion: v1\nkind: Bar\n".to_string(),
            diff: None,
        }
    );
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_dry_run_with_diff() {
    let store = MemoryStore::with_content(CONTENT);
    let opts = RunOptions {
        dry_run: true,
        show_diff: true,
        ..options(&["kind"], "Bar")
    };

    let RunOutcome::DryRun { diff, .. } = run(&store, &opts).await.unwrap() else {
        panic!("expected a dry run");
    };
    let diff = diff.unwrap();
    assert!(diff.contains("--- a/app.yaml"));
    assert!(diff.contains("-kind: Foo\n+kind: Bar\n"));
}

#[tokio::test]
async fn test_commit_builds_on_fetched_commit() {
    let store = MemoryStore::with_content(CONTENT);

    let outcome = run(&store, &options(&["kind"], "Bar")).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Committed {
            commit_sha: "commit-2".to_string()
        }
    );
    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    let request = &commits[0];
    assert_eq!(request.parent, "commit-1");
    assert_eq!(request.base_tree, "tree-1");
    assert_eq!(request.location.path, "app.yaml");
    assert_eq!(request.location.branch, "main");
    assert_eq!(request.message, "Update app.yaml");
    assert_eq!(request.author.email, "octocat@users.noreply.github.com");
    assert_eq!(request.content, "# deployed by CI\napiVersion: v1\nkind: Bar\n");
}

#[tokio::test]
async fn test_unchanged_content_is_not_committed() {
    let store = MemoryStore::with_content(CONTENT);

    let missing = run(&store, &options(&["kindergarten"], "Bar")).await.unwrap();
    let same = run(&store, &options(&["kind"], "Foo")).await.unwrap();

    let unchanged = RunOutcome::Unchanged {
        commit_sha: "commit-1".to_string(),
    };
    assert_eq!(missing, unchanged);
    assert_eq!(same, unchanged);
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_warn_missing_does_not_fail() {
    let store = MemoryStore::with_content(CONTENT);
    let opts = RunOptions {
        warn_missing: true,
        ..options(&["kindergarten", "kind"], "Bar")
    };

    let outcome = run(&store, &opts).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Committed { .. }));
}

#[tokio::test]
async fn test_fetch_failure() {
    let store = MemoryStore {
        file: None,
        ..MemoryStore::with_content(CONTENT)
    };

    let err = run(&store, &options(&["kind"], "Bar")).await.unwrap_err();

    assert!(matches!(err, DriverError::Fetch { .. }));
    assert_eq!(
        err.to_string(),
        "fetch app.yaml from github.com/acme/deploy@main"
    );
}

#[tokio::test]
async fn test_invalid_yaml_is_edit_error() {
    let store = MemoryStore::with_content("kind: [Foo\n");

    let err = run(&store, &options(&["kind"], "Bar")).await.unwrap_err();

    assert!(matches!(err, DriverError::Edit { .. }));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_rejected_commit() {
    let store = MemoryStore {
        reject_commit: true,
        ..MemoryStore::with_content(CONTENT)
    };

    let err = run(&store, &options(&["kind"], "Bar")).await.unwrap_err();

    assert!(matches!(err, DriverError::Commit { .. }));
    assert_eq!(err.to_string(), "commit app.yaml to main");
}
