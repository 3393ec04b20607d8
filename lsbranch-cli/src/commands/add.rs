//! Add command - register a repo in the config

use std::path::{Component, Path, PathBuf};

use clap::Args;
use lsbranch_core::{validate_repo_path, Error, RepoRef, RepoStatus};

use super::{ensure_valid, report_error, AlreadyReported, CommandContext};

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// The path to the repo root
    #[arg(long, value_name = "REPO_PATH")]
    pub path: PathBuf,

    /// The repo's alias
    #[arg(long, value_name = "ALIAS")]
    pub alias: Option<String>,

    /// If specified, do not ensure that the repo being added exists and is valid
    #[arg(long)]
    pub no_validate: bool,
}

impl AddArgs {
    /// Execute the add command
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let mut config = ctx.store.load()?;
        if config.exists() {
            ensure_valid(&config)?;
        }

        let path = resolve_path(&self.path)?;
        let mut repo = RepoRef::new(&path);
        if let Some(alias) = &self.alias {
            repo = repo.with_alias(alias);
        }

        if !self.no_validate {
            let validation = validate_repo_path(ctx.resolver.as_ref(), &path).await?;
            if let RepoStatus::Failure(e) = &validation.status {
                report_error(format!("Specified repo path is not valid: {}", e));
                report_error("If this is expected, provide the \"--no-validate\" flag");
                return Err(AlreadyReported.into());
            }
        }

        let name = repo.display_name();
        match ctx.store.try_add_repo(&mut config, repo) {
            Ok(()) => {
                println!("Added {} to {}", name, ctx.store.path().display());
                Ok(())
            }
            Err(Error::Duplicate(issues)) => {
                for issue in issues {
                    report_error(issue);
                }
                Err(AlreadyReported.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Make `path` absolute and drop `.` and `..` segments without touching the
/// filesystem
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsbranch_core::{ConfigStore, GitStatusResolver};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> CommandContext {
        CommandContext {
            store: ConfigStore::new(Some(dir.path().join("config.json"))).unwrap(),
            resolver: Arc::new(GitStatusResolver::new()),
        }
    }

    fn add_args(path: &Path, alias: Option<&str>, no_validate: bool) -> AddArgs {
        AddArgs {
            path: path.to_path_buf(),
            alias: alias.map(str::to_string),
            no_validate,
        }
    }

    #[test]
    fn test_resolve_path_normalizes() {
        let resolved = resolve_path(Path::new("/src/./app/../lib")).unwrap();
        assert_eq!(resolved, PathBuf::from("/src/lib"));

        let resolved = resolve_path(Path::new("relative/dir")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));
    }

    #[tokio::test]
    async fn test_add_valid_repo() {
        let dir = TempDir::new().unwrap();
        let repo_dir = dir.path().join("repo");
        std::fs::create_dir_all(repo_dir.join(".git")).unwrap();
        std::fs::write(repo_dir.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        let ctx = context(&dir);

        add_args(&repo_dir, Some("repo"), false)
            .execute(&ctx)
            .await
            .unwrap();

        let config = ctx.store.load().unwrap();
        assert_eq!(config.repos(), &[RepoRef::new(&repo_dir).with_alias("repo")]);
    }

    #[tokio::test]
    async fn test_add_invalid_repo_is_rejected() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let err = add_args(&dir.path().join("missing"), None, false)
            .execute(&ctx)
            .await
            .unwrap_err();
        assert!(err.is::<AlreadyReported>());
        assert!(!ctx.store.load().unwrap().exists());
    }

    #[tokio::test]
    async fn test_add_without_validation() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        add_args(&dir.path().join("missing"), None, true)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(ctx.store.load().unwrap().repos().len(), 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_alias() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        add_args(&dir.path().join("one"), Some("same"), true)
            .execute(&ctx)
            .await
            .unwrap();
        let err = add_args(&dir.path().join("two"), Some("same"), true)
            .execute(&ctx)
            .await
            .unwrap_err();

        assert!(err.is::<AlreadyReported>());
        assert_eq!(ctx.store.load().unwrap().repos().len(), 1);
    }
}
