//! Fetch, edit and commit one file in a remote repository.
//!
//! [`run`] reads the file from the head of a branch, replaces the requested
//! locations and then either hands the result back for printing (dry run)
//! or commits it on top of the commit it was read from.

use similar::TextDiff;
use thiserror::Error;
use tracing::{info, warn};

use crate::editor::edit_with_report;
use crate::error::EditError;
use crate::remote::{CommitAuthor, CommitRequest, FileLocation, ObjectStore, StoreError};

/// What to change, where, and how to record it.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub location: FileLocation,
    /// Dotted key paths to replace, in order.
    pub locations: Vec<String>,
    pub replacement: String,
    pub dry_run: bool,
    /// Produce a unified diff instead of the full content on a dry run.
    pub show_diff: bool,
    pub author: CommitAuthor,
    pub message: String,
    /// Log a warning for every location that does not resolve.
    pub warn_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was written. `content` is the edited file; `diff` is set when
    /// a diff was requested.
    DryRun {
        commit_sha: String,
        content: String,
        diff: Option<String>,
    },
    /// The edit did not change the file, so no commit was created.
    Unchanged { commit_sha: String },
    Committed { commit_sha: String },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("fetch {location}")]
    Fetch {
        location: FileLocation,
        #[source]
        source: StoreError,
    },
    #[error("replace content at locations {locations:?} with {replacement:?} in file {file}")]
    Edit {
        locations: Vec<String>,
        replacement: String,
        file: String,
        #[source]
        source: EditError,
    },
    #[error("commit {file} to {branch}")]
    Commit {
        file: String,
        branch: String,
        #[source]
        source: StoreError,
    },
}

/// Runs one fetch, edit and (unless dry) commit cycle against `store`.
///
/// # Errors
///
/// Fails if the file cannot be fetched, is not valid YAML, or the commit is
/// rejected. Locations that do not resolve are never an error.
pub async fn run<S: ObjectStore + ?Sized>(
    store: &S,
    options: &RunOptions,
) -> Result<RunOutcome, DriverError> {
    let location = &options.location;
    let fetched = store
        .fetch_file(location)
        .await
        .map_err(|source| DriverError::Fetch {
            location: location.clone(),
            source,
        })?;
    info!(commit = %fetched.commit_sha, file = %location.path, "fetched file");

    let report = edit_with_report(&fetched.content, &options.locations, &options.replacement)
        .map_err(|source| DriverError::Edit {
            locations: options.locations.clone(),
            replacement: options.replacement.clone(),
            file: location.path.clone(),
            source,
        })?;
    if options.warn_missing {
        for path in &report.missing {
            warn!(location = %path, file = %location.path, "location not found");
        }
    }

    if options.dry_run {
        let diff = options
            .show_diff
            .then(|| unified_diff(&fetched.content, &report.content, &location.path))
            .flatten();
        return Ok(RunOutcome::DryRun {
            commit_sha: fetched.commit_sha,
            content: report.content,
            diff,
        });
    }

    if report.content == fetched.content {
        info!(commit = %fetched.commit_sha, "content unchanged, nothing to commit");
        return Ok(RunOutcome::Unchanged {
            commit_sha: fetched.commit_sha,
        });
    }

    let request = CommitRequest {
        location: location.clone(),
        content: report.content,
        message: options.message.clone(),
        base_tree: fetched.tree_sha,
        parent: fetched.commit_sha,
        author: options.author.clone(),
    };
    let commit_sha = store
        .commit_file(&request)
        .await
        .map_err(|source| DriverError::Commit {
            file: location.path.clone(),
            branch: location.branch.clone(),
            source,
        })?;
    info!(commit = %commit_sha, branch = %location.branch, "created commit");
    Ok(RunOutcome::Committed { commit_sha })
}

/// Unified diff between two versions of `path`, or `None` when they are
/// identical.
pub fn unified_diff(old: &str, new: &str, path: &str) -> Option<String> {
    let diff = TextDiff::from_lines(old, new);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", path), &format!("b/{}", path))
        .to_string();
    if unified.is_empty() {
        None
    } else {
        Some(unified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_marks_changed_line() {
        let diff = unified_diff("a: 1\nb: 2\n", "a: 1\nb: 3\n", "x.yaml").unwrap();
        assert!(diff.starts_with("--- a/x.yaml\n+++ b/x.yaml\n"));
        assert!(diff.contains("-b: 2\n+b: 3\n"));
        assert!(diff.contains(" a: 1\n"));
    }

    #[test]
    fn test_unified_diff_identical() {
        assert_eq!(unified_diff("a: 1\n", "a: 1\n", "x.yaml"), None);
    }
}
