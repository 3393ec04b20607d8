//! Per-repository status resolution

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;

use super::branches::parse_branch_listing;
use super::head::HeadRef;
use crate::config::GitSettings;
use crate::repo::RepoRef;
use crate::status::{RepoData, RepoError, RepoStatus};
use crate::{Error, Result};

/// Resolves the branch status of a single repository
///
/// Expected failures come back as [`RepoStatus::Failure`]; an `Err` means the
/// environment is broken and the whole batch should be abandoned.
#[async_trait]
pub trait StatusResolver: Send + Sync {
    /// Resolve `repo`, listing every local branch when `all_branches` is set
    ///
    /// Returns the bare status; callers that need it tied to the repo wrap it
    /// in a [`crate::RepoStatusResult`], as [`crate::resolve_all`] does.
    async fn resolve(&self, repo: &RepoRef, all_branches: bool) -> Result<RepoStatus>;
}

/// Resolver backed by `.git/HEAD` and the `git` executable
#[derive(Debug, Clone)]
pub struct GitStatusResolver {
    git_path: String,
}

impl GitStatusResolver {
    /// Create a resolver that runs `git` from `PATH`
    pub fn new() -> Self {
        Self {
            git_path: "git".to_string(),
        }
    }

    /// Use a custom git executable
    pub fn with_git_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Create a resolver from loaded git settings
    pub fn from_settings(settings: &GitSettings) -> Self {
        Self::new().with_git_path(settings.git_path.clone())
    }

    pub fn git_path(&self) -> &str {
        &self.git_path
    }

    /// Read the checked-out branch straight from `.git/HEAD`
    async fn read_head(&self, repo: &RepoRef) -> Result<RepoStatus> {
        let git_dir = repo.path().join(".git");
        let head_path = git_dir.join("HEAD");

        let contents = match fs::read(&head_path).await {
            Ok(bytes) => bytes,
            Err(e) if is_not_exist(&e) => {
                let error = if path_exists(&git_dir).await? {
                    RepoError::HeadFileMissing
                } else {
                    RepoError::GitFolderMissing
                };
                return Ok(error.into());
            }
            Err(e) => {
                return Err(Error::Other(format!(
                    "Failed to read {}: {}",
                    head_path.display(),
                    e
                )))
            }
        };

        if contents.is_empty() {
            return Ok(RepoError::HeadFileEmpty.into());
        }

        let head = HeadRef::parse(&String::from_utf8_lossy(&contents));
        Ok(RepoData::checked_out(head.into_name()).into())
    }

    /// Run `git branch` in the repository and parse its output
    async fn list_branches(&self, repo: &RepoRef) -> Result<RepoStatus> {
        // A missing or non-directory working directory would otherwise surface
        // as a spawn failure indistinguishable from a missing git executable.
        if !is_directory(repo.path()).await? {
            return Ok(RepoError::GitFolderMissing.into());
        }

        tracing::debug!(
            git = %self.git_path,
            repo = %repo.path().display(),
            "Running git branch"
        );

        let output = Command::new(&self.git_path)
            .arg("branch")
            .current_dir(repo.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    Error::Git(format!(
                        "git executable not found at '{}'. Is git installed?",
                        self.git_path
                    ))
                } else {
                    Error::Git(format!("Failed to run '{} branch': {}", self.git_path, e))
                }
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if !output.status.success() {
            return Ok(RepoError::GitBranchFailed {
                code: output.status.code(),
                stderr,
            }
            .into());
        }

        if !output.stderr.is_empty() {
            return Ok(RepoError::GitBranchStderr(stderr).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(match parse_branch_listing(&stdout) {
            Ok(data) => RepoStatus::Success(data),
            Err(e) => RepoStatus::Failure(e),
        })
    }
}

impl Default for GitStatusResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusResolver for GitStatusResolver {
    async fn resolve(&self, repo: &RepoRef, all_branches: bool) -> Result<RepoStatus> {
        let status = if all_branches {
            self.list_branches(repo).await?
        } else {
            self.read_head(repo).await?
        };

        tracing::debug!(
            repo = %repo.path().display(),
            all_branches,
            success = status.is_success(),
            "Resolved repo status"
        );

        Ok(status)
    }
}

fn is_not_exist(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Metadata for `path`, or `None` when it is missing or sits under a regular file
async fn metadata_if_exists(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if is_not_exist(&e) => Ok(None),
        Err(e) => Err(Error::Other(format!(
            "Failed to check {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn path_exists(path: &Path) -> Result<bool> {
    Ok(metadata_if_exists(path).await?.is_some())
}

async fn is_directory(path: &Path) -> Result<bool> {
    Ok(metadata_if_exists(path).await?.is_some_and(|m| m.is_dir()))
}
