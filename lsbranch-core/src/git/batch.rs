//! Concurrent resolution of configured repositories

use std::path::Path;
use std::sync::Arc;

use super::resolver::StatusResolver;
use crate::repo::RepoRef;
use crate::status::RepoStatusResult;
use crate::{Error, Result};

/// Resolve every repository concurrently
///
/// One task is spawned per repository. Results come back in the same order as
/// `repos`, whatever order the tasks finish in. Per-repository failures are
/// part of the returned data; the first fatal error fails the whole batch.
pub async fn resolve_all<R>(
    resolver: Arc<R>,
    repos: &[RepoRef],
    all_branches: bool,
) -> Result<Vec<RepoStatusResult>>
where
    R: StatusResolver + ?Sized + 'static,
{
    tracing::debug!(count = repos.len(), all_branches, "Resolving repos");

    let handles: Vec<_> = repos
        .iter()
        .cloned()
        .map(|repo| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move {
                let status = resolver.resolve(&repo, all_branches).await?;
                Ok::<_, Error>(RepoStatusResult::new(repo, status))
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| Error::Other(format!("Repo resolution task failed: {}", e)))??;
        results.push(result);
    }

    Ok(results)
}

/// Check that `path` looks like a git clone before it is added to the config
///
/// Equivalent to resolving the path on the fast path.
pub async fn validate_repo_path<R>(
    resolver: &R,
    path: impl AsRef<Path>,
) -> Result<RepoStatusResult>
where
    R: StatusResolver + ?Sized,
{
    let repo = RepoRef::new(path.as_ref());
    let status = resolver.resolve(&repo, false).await?;
    Ok(RepoStatusResult::new(repo, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitStatusResolver;
    use crate::status::{RepoData, RepoError, RepoStatus};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Resolver that reports the path's file name as the branch after an
    /// optional per-repo delay
    struct DelayedResolver {
        delays: HashMap<PathBuf, Duration>,
    }

    #[async_trait]
    impl StatusResolver for DelayedResolver {
        async fn resolve(&self, repo: &RepoRef, _all_branches: bool) -> Result<RepoStatus> {
            if let Some(delay) = self.delays.get(repo.path()) {
                tokio::time::sleep(*delay).await;
            }

            let name = repo.path().file_name().unwrap().to_string_lossy();
            if name.starts_with("broken") {
                return Ok(RepoError::HeadFileEmpty.into());
            }
            if name.starts_with("fatal") {
                return Err(Error::Other("permission denied".to_string()));
            }
            Ok(RepoData::checked_out(name).into())
        }
    }

    fn repos(names: &[&str]) -> Vec<RepoRef> {
        names.iter().map(|n| RepoRef::new(format!("/repos/{}", n))).collect()
    }

    #[tokio::test]
    async fn test_preserves_input_order_despite_delays() {
        let mut delays = HashMap::new();
        delays.insert(PathBuf::from("/repos/a"), Duration::from_millis(200));
        delays.insert(PathBuf::from("/repos/b"), Duration::from_millis(50));
        let resolver = Arc::new(DelayedResolver { delays });

        let input = repos(&["a", "b", "c", "d"]);
        let results = resolve_all(resolver, &input, false).await.unwrap();

        let branches: Vec<_> = results
            .iter()
            .map(|r| r.status.data().unwrap().checked_out_branch.as_str())
            .collect();
        assert_eq!(branches, vec!["a", "b", "c", "d"]);

        let result_repos: Vec<_> = results.into_iter().map(|r| r.repo).collect();
        assert_eq!(result_repos, input);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let resolver = Arc::new(DelayedResolver {
            delays: HashMap::new(),
        });

        let results = resolve_all(resolver, &repos(&["a", "broken", "c"]), true)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].status.is_success());
        assert_eq!(
            results[1].status,
            RepoStatus::Failure(RepoError::HeadFileEmpty)
        );
        assert!(results[2].status.is_success());
    }

    #[tokio::test]
    async fn test_fatal_error_fails_batch() {
        let resolver = Arc::new(DelayedResolver {
            delays: HashMap::new(),
        });

        let err = resolve_all(resolver, &repos(&["a", "fatal", "c"]), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let resolver = Arc::new(DelayedResolver {
            delays: HashMap::new(),
        });
        let results = resolve_all(resolver, &[], false).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_works_with_trait_objects() {
        let resolver: Arc<dyn StatusResolver> = Arc::new(GitStatusResolver::new());
        let dir = TempDir::new().unwrap();

        let results = resolve_all(resolver, &[RepoRef::new(dir.path())], false)
            .await
            .unwrap();
        assert_eq!(
            results[0].status,
            RepoStatus::Failure(RepoError::GitFolderMissing)
        );
    }

    #[tokio::test]
    async fn test_validate_repo_path() {
        let dir = TempDir::new().unwrap();
        let resolver = GitStatusResolver::new();

        let result = validate_repo_path(&resolver, dir.path()).await.unwrap();
        assert_eq!(result.repo, RepoRef::new(dir.path()));
        assert_eq!(
            result.status,
            RepoStatus::Failure(RepoError::GitFolderMissing)
        );

        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        let result = validate_repo_path(&resolver, dir.path()).await.unwrap();
        assert_eq!(
            result.status,
            RepoStatus::Success(RepoData::checked_out("main"))
        );
    }

    fn valid_repo(root: &std::path::Path) -> PathBuf {
        let repo = root.join("ok");
        std::fs::create_dir_all(repo.join(".git")).unwrap();
        std::fs::write(repo.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        repo
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_repo_path_fails_only_its_row() {
        let dir = TempDir::new().unwrap();
        let ok = valid_repo(dir.path());
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "plain file").unwrap();
        let input = vec![RepoRef::new(&ok), RepoRef::new(&file)];

        for all_branches in [false, true] {
            let resolver = Arc::new(GitStatusResolver::new().with_git_path("/bin/sh"));
            let results = resolve_all(resolver, &input, all_branches).await.unwrap();
            assert_eq!(results.len(), 2);
            assert_eq!(
                results[1].status,
                RepoStatus::Failure(RepoError::GitFolderMissing)
            );
        }

        let resolver = Arc::new(GitStatusResolver::new());
        let results = resolve_all(resolver, &input, false).await.unwrap();
        assert_eq!(
            results[0].status,
            RepoStatus::Success(RepoData::checked_out("main"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_head_fails_batch() {
        let dir = TempDir::new().unwrap();
        let ok = valid_repo(dir.path());
        let broken = dir.path().join("broken");
        std::fs::create_dir_all(broken.join(".git").join("HEAD")).unwrap();

        let resolver = Arc::new(GitStatusResolver::new());
        let result = resolve_all(
            resolver,
            &[RepoRef::new(&ok), RepoRef::new(&broken)],
            false,
        )
        .await;
        assert!(result.is_err());
    }
}
