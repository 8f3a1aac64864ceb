//! [`ObjectStore`] backed by the GitHub REST API.
//!
//! Reads resolve the branch head, list its tree and download the file's
//! blob by SHA, which has no size cap. Writes use the Git data API: blob,
//! tree, commit, then a non-forced ref update, so a branch that moved since
//! the fetch is never overwritten.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommitRequest, FetchedFile, FileLocation, ObjectStore, StoreError};

pub struct GitHubStore {
    client: Octocrab,
}

impl GitHubStore {
    /// Creates a store authenticated with a personal access token.
    pub fn new(token: impl Into<String>) -> Result<Self, StoreError> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|err| StoreError::api("build client", err))?;
        Ok(Self { client })
    }

    /// Creates an unauthenticated store, enough for reading public
    /// repositories.
    pub fn anonymous() -> Result<Self, StoreError> {
        let client = Octocrab::builder()
            .build()
            .map_err(|err| StoreError::api("build client", err))?;
        Ok(Self { client })
    }
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: Option<BranchCommit>,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    tree: Option<ObjectRef>,
}

#[derive(Debug, Deserialize)]
struct ObjectRef {
    sha: String,
}

#[derive(Debug, Serialize)]
struct TreeQuery {
    recursive: u8,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Serialize)]
struct NewBlob<'a> {
    content: &'a str,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: [TreeEntry<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct Signature<'a> {
    name: &'a str,
    email: &'a str,
    date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct NewCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
    author: &'a Signature<'a>,
    committer: &'a Signature<'a>,
}

#[derive(Debug, Serialize)]
struct RefUpdate<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ObjectRef,
}

fn repo_route(location: &FileLocation, rest: &str) -> String {
    format!("/repos/{}/{}/{}", location.owner, location.repo, rest)
}

/// SHA of the blob at `path` in a recursively listed tree.
fn find_blob(
    tree: &TreeResponse,
    path: &str,
    commit: &str,
    tree_sha: &str,
) -> Result<String, StoreError> {
    if tree.truncated {
        return Err(StoreError::TruncatedTree {
            tree: tree_sha.to_string(),
        });
    }
    let item = tree
        .tree
        .iter()
        .find(|item| item.path == path)
        .ok_or_else(|| StoreError::FileNotFound {
            path: path.to_string(),
            commit: commit.to_string(),
        })?;
    if item.kind != "blob" {
        return Err(StoreError::NotAFile {
            path: path.to_string(),
        });
    }
    Ok(item.sha.clone())
}

/// Blob content as text. GitHub wraps base64 content across lines.
fn decode_blob(path: &str, blob: &BlobResponse) -> Result<String, StoreError> {
    match blob.encoding.as_str() {
        "utf-8" => Ok(blob.content.clone()),
        "base64" => {
            let packed: String = blob
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD.decode(packed).map_err(|_| StoreError::Undecodable {
                path: path.to_string(),
            })?;
            String::from_utf8(bytes).map_err(|_| StoreError::Undecodable {
                path: path.to_string(),
            })
        }
        other => Err(StoreError::UnknownEncoding {
            path: path.to_string(),
            encoding: other.to_string(),
        }),
    }
}

#[async_trait]
impl ObjectStore for GitHubStore {
    async fn fetch_file(&self, location: &FileLocation) -> Result<FetchedFile, StoreError> {
        let route = repo_route(location, &format!("branches/{}", location.branch));
        let branch: BranchResponse = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|err| StoreError::api("get branch", err))?;

        let commit = branch.commit.ok_or_else(|| StoreError::NoCommit {
            branch: location.branch.clone(),
        })?;
        let tree_sha = commit
            .commit
            .tree
            .map(|tree| tree.sha)
            .filter(|sha| !sha.is_empty())
            .ok_or_else(|| StoreError::NoTree {
                commit: commit.sha.clone(),
            })?;
        debug!(commit = %commit.sha, tree = %tree_sha, "resolved branch head");

        let tree: TreeResponse = self
            .client
            .get(
                repo_route(location, &format!("git/trees/{}", tree_sha)),
                Some(&TreeQuery { recursive: 1 }),
            )
            .await
            .map_err(|err| {
                StoreError::api(
                    format!("fetch tree {} from commit {}", tree_sha, commit.sha),
                    err,
                )
            })?;
        let blob_sha = find_blob(&tree, &location.path, &commit.sha, &tree_sha)?;

        let blob: BlobResponse = self
            .client
            .get(
                repo_route(location, &format!("git/blobs/{}", blob_sha)),
                None::<&()>,
            )
            .await
            .map_err(|err| StoreError::api(format!("fetch blob {}", blob_sha), err))?;
        let content = decode_blob(&location.path, &blob)?;

        Ok(FetchedFile {
            content,
            tree_sha,
            commit_sha: commit.sha,
        })
    }

    async fn commit_file(&self, request: &CommitRequest) -> Result<String, StoreError> {
        let location = &request.location;

        let encoded = STANDARD.encode(&request.content);
        let blob: ObjectRef = self
            .client
            .post(
                repo_route(location, "git/blobs"),
                Some(&NewBlob {
                    content: &encoded,
                    encoding: "base64",
                }),
            )
            .await
            .map_err(|err| StoreError::api("create blob", err))?;
        debug!(blob = %blob.sha, "created blob");

        let tree: ObjectRef = self
            .client
            .post(
                repo_route(location, "git/trees"),
                Some(&NewTree {
                    base_tree: &request.base_tree,
                    tree: [TreeEntry {
                        path: &location.path,
                        mode: "100644",
                        kind: "blob",
                        sha: &blob.sha,
                    }],
                }),
            )
            .await
            .map_err(|err| StoreError::api(format!("create tree with blob {}", blob.sha), err))?;
        debug!(tree = %tree.sha, "created tree");

        let signature = Signature {
            name: &request.author.name,
            email: &request.author.email,
            date: Utc::now(),
        };
        let commit: ObjectRef = self
            .client
            .post(
                repo_route(location, "git/commits"),
                Some(&NewCommit {
                    message: &request.message,
                    tree: &tree.sha,
                    parents: [&request.parent],
                    author: &signature,
                    committer: &signature,
                }),
            )
            .await
            .map_err(|err| {
                StoreError::api(
                    format!(
                        "create commit from tree {} and parent {}",
                        tree.sha, request.parent
                    ),
                    err,
                )
            })?;

        let head = format!("heads/{}", location.branch);
        let updated: RefResponse = self
            .client
            .patch(
                repo_route(location, &format!("git/refs/{}", head)),
                Some(&RefUpdate {
                    sha: &commit.sha,
                    force: false,
                }),
            )
            .await
            .map_err(|err| StoreError::api(format!("move {} to commit {}", head, commit.sha), err))?;
        debug!(head = %head, sha = %updated.object.sha, "updated ref");

        Ok(commit.sha)
    }
}
