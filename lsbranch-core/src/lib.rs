//! lsbranch core - branch reporting for a curated list of local git clones
//!
//! This crate resolves the checked-out branch of each configured repository,
//! either by reading `.git/HEAD` directly or by asking `git branch` for the
//! full list of local branches.

pub mod config;
pub mod error;
pub mod git;
pub mod repo;
pub mod status;

pub use config::{ConfigFile, ConfigStore, DuplicateEntry, GitSettings, LoadedConfig, CONFIG_FILENAME};
pub use error::{Error, Result};
pub use git::{
    parse_branch_listing, resolve_all, validate_repo_path, GitStatusResolver, HeadRef,
    StatusResolver,
};
pub use repo::RepoRef;
pub use status::{RepoData, RepoError, RepoStatus, RepoStatusResult};
