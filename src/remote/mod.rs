//! Reading and committing single files in a remote Git repository.
//!
//! The [`ObjectStore`] trait is the only thing the change driver talks to.
//! [`github::GitHubStore`] implements it on top of the GitHub REST API;
//! tests substitute an in-memory store.

pub mod github;

use async_trait::async_trait;
use thiserror::Error;

pub use github::GitHubStore;

/// A file on a branch of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl FileLocation {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for FileLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from github.com/{}/{}@{}",
            self.path, self.owner, self.repo, self.branch
        )
    }
}

/// File content together with the commit it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub content: String,
    /// Tree of the branch head, used as the base of the new tree.
    pub tree_sha: String,
    /// Branch head, used as the parent of the new commit.
    pub commit_sha: String,
}

/// Author and committer identity of a new commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl CommitAuthor {
    /// Identity of a GitHub user, with their no-reply address.
    pub fn from_username(username: &str) -> Self {
        Self {
            name: username.to_string(),
            email: format!("{}@users.noreply.github.com", username),
        }
    }
}

/// Everything needed to commit new content for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub location: FileLocation,
    pub content: String,
    pub message: String,
    pub base_tree: String,
    pub parent: String,
    pub author: CommitAuthor,
}

/// Failures talking to the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{step}: {source}")]
    Api {
        step: String,
        #[source]
        source: octocrab::Error,
    },
    #[error("no commit on branch {branch}")]
    NoCommit { branch: String },
    #[error("no tree in commit {commit}")]
    NoTree { commit: String },
    #[error("file {path} not found in commit {commit}")]
    FileNotFound { path: String, commit: String },
    #[error("{path} is not a regular file")]
    NotAFile { path: String },
    #[error("cannot decode content of {path}")]
    Undecodable { path: String },
    #[error("unknown encoding {encoding:?} for {path}")]
    UnknownEncoding { path: String, encoding: String },
    #[error("github truncated tree {tree}, aborting")]
    TruncatedTree { tree: String },
}

impl StoreError {
    pub(crate) fn api(step: impl Into<String>, source: octocrab::Error) -> Self {
        StoreError::Api {
            step: step.into(),
            source,
        }
    }
}

/// Read and write access to files in a remote repository.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the file at the head of its branch.
    async fn fetch_file(&self, location: &FileLocation) -> Result<FetchedFile, StoreError>;

    /// Commits new file content on top of `request.parent` and moves the
    /// branch to it. Returns the new commit's SHA.
    async fn commit_file(&self, request: &CommitRequest) -> Result<String, StoreError>;
}
