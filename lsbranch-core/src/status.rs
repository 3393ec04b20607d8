//! Per-repository resolution results

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::repo::RepoRef;

/// Branch information for a repository that resolved successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoData {
    /// The branch currently checked out, or the commit SHA for a detached HEAD
    pub checked_out_branch: String,

    /// Every other local branch in `git branch` order; only populated when
    /// all branches were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_branches: Option<Vec<String>>,
}

impl RepoData {
    /// Result of reading `.git/HEAD`
    pub fn checked_out(branch: impl Into<String>) -> Self {
        Self {
            checked_out_branch: branch.into(),
            other_branches: None,
        }
    }

    /// Result of listing all local branches
    pub fn with_other_branches(branch: impl Into<String>, other_branches: Vec<String>) -> Self {
        Self {
            checked_out_branch: branch.into(),
            other_branches: Some(other_branches),
        }
    }
}

/// Expected reasons a single repository could not be resolved
///
/// These are reported next to the repository they belong to and never abort
/// resolution of the rest of a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error(".git folder doesn't exist")]
    GitFolderMissing,

    #[error(".git/HEAD file doesn't exist")]
    HeadFileMissing,

    #[error(".git/HEAD file is empty")]
    HeadFileEmpty,

    /// `git branch` exited unsuccessfully; `code` is `None` when it was
    /// terminated by a signal
    #[error("git branch failed with exit code {}: {stderr}", exit_code_label(.code))]
    GitBranchFailed { code: Option<i32>, stderr: String },

    #[error("git branch wrote to stderr failed: {0}")]
    GitBranchStderr(String),

    #[error("git branch did not report a checked out branch")]
    NoCheckedOutBranch,

    #[error("git branch reported multiple checked out branches: {}", .0.join(", "))]
    MultipleCheckedOutBranches(Vec<String>),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

impl Serialize for RepoError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of resolving one repository: exactly one of data or error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RepoStatus {
    #[serde(rename = "data")]
    Success(RepoData),

    #[serde(rename = "error")]
    Failure(RepoError),
}

impl RepoStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Branch data, if resolution succeeded
    pub fn data(&self) -> Option<&RepoData> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if resolution did not succeed
    pub fn error(&self) -> Option<&RepoError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }
}

impl From<RepoError> for RepoStatus {
    fn from(error: RepoError) -> Self {
        Self::Failure(error)
    }
}

impl From<RepoData> for RepoStatus {
    fn from(data: RepoData) -> Self {
        Self::Success(data)
    }
}

/// A [`RepoStatus`] paired with the repository it describes
///
/// Serializes as `{"repo": {...}, "data": {...}}` or
/// `{"repo": {...}, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatusResult {
    pub repo: RepoRef,

    #[serde(flatten)]
    pub status: RepoStatus,
}

impl RepoStatusResult {
    pub fn new(repo: RepoRef, status: RepoStatus) -> Self {
        Self { repo, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RepoError::GitBranchFailed {
                code: Some(128),
                stderr: "fatal: not a git repository".to_string(),
            }
            .to_string(),
            "git branch failed with exit code 128: fatal: not a git repository"
        );
        assert_eq!(
            RepoError::GitBranchFailed {
                code: None,
                stderr: String::new(),
            }
            .to_string(),
            "git branch failed with exit code unknown: "
        );
        assert_eq!(
            RepoError::MultipleCheckedOutBranches(vec!["main".into(), "dev".into()]).to_string(),
            "git branch reported multiple checked out branches: main, dev"
        );
    }

    #[test]
    fn test_success_json_shape() {
        let result = RepoStatusResult::new(
            RepoRef::new("/src/app").with_alias("app"),
            RepoData::with_other_branches("main", vec!["dev".into()]).into(),
        );

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "repo": { "path": "/src/app", "alias": "app" },
                "data": { "checkedOutBranch": "main", "otherBranches": ["dev"] }
            })
        );
    }

    #[test]
    fn test_fast_path_json_omits_other_branches() {
        let result = RepoStatusResult::new(
            RepoRef::new("/src/app"),
            RepoData::checked_out("main").into(),
        );

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "repo": { "path": "/src/app" },
                "data": { "checkedOutBranch": "main" }
            })
        );
    }

    #[test]
    fn test_failure_json_shape() {
        let result =
            RepoStatusResult::new(RepoRef::new("/src/app"), RepoError::HeadFileEmpty.into());

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "repo": { "path": "/src/app" },
                "error": ".git/HEAD file is empty"
            })
        );
    }

    #[test]
    fn test_accessors() {
        let ok: RepoStatus = RepoData::checked_out("main").into();
        assert!(ok.is_success());
        assert_eq!(ok.data().unwrap().checked_out_branch, "main");
        assert!(ok.error().is_none());

        let failed: RepoStatus = RepoError::NoCheckedOutBranch.into();
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some(&RepoError::NoCheckedOutBranch));
    }
}
