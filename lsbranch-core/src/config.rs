//! Configuration management for lsbranch
//!
//! The repo list lives in a JSON file, `~/.lsbranchrc.json` unless overridden
//! with `--config` / `LSBRANCH_CONFIG`.
//!
//! Git settings are resolved with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (LSBRANCH_*)
//! 3. Default values

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::repo::RepoRef;
use crate::{Error, Result};

/// File name of the config file in the user's home directory
pub const CONFIG_FILENAME: &str = ".lsbranchrc.json";

/// On-disk shape of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    /// Editor schema hint, kept as-is
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Milliseconds since the epoch of the last update check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_check: Option<u64>,

    /// Configured repositories, in display order
    pub repos: Vec<RepoRef>,
}

/// A path or alias value that appears more than once in the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    /// `"path"` or `"alias"`
    pub property: &'static str,
    pub value: String,
    pub count: usize,
}

impl fmt::Display for DuplicateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repo {} \"{}\" is specified multiple times.",
            self.property, self.value
        )
    }
}

/// Config contents plus whether they came from an existing file
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    data: ConfigFile,
    exists: bool,
}

impl LoadedConfig {
    /// Whether the config file was present on disk
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn repos(&self) -> &[RepoRef] {
        &self.data.repos
    }

    pub fn data(&self) -> &ConfigFile {
        &self.data
    }

    /// Find every path or alias that is used by more than one repo
    pub fn validate(&self) -> Vec<DuplicateEntry> {
        let mut duplicates = Vec::new();
        for (property, values) in unique_values(&self.data.repos) {
            for (value, count) in values {
                if count > 1 {
                    duplicates.push(DuplicateEntry {
                        property,
                        value,
                        count,
                    });
                }
            }
        }
        duplicates
    }
}

/// Values of each unique repo property with their occurrence counts, in
/// first-seen order
fn unique_values(repos: &[RepoRef]) -> [(&'static str, Vec<(String, usize)>); 2] {
    fn count(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for value in values {
            match index.get(&value) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }
        counts
    }

    [
        (
            "path",
            count(repos.iter().map(|r| r.path.to_string_lossy().into_owned())),
        ),
        ("alias", count(repos.iter().filter_map(|r| r.alias.clone()))),
    ]
}

/// Reads and writes the lsbranch config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    is_default_path: bool,
}

impl ConfigStore {
    /// Create a store for `path`, or for the default location when `None`
    ///
    /// Relative paths are resolved against the current directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let default_path = Self::default_config_path();

        let path = match path {
            Some(path) => std::path::absolute(&path).map_err(|e| {
                Error::Config(format!(
                    "Unable to resolve config path {}: {}",
                    path.display(),
                    e
                ))
            })?,
            None => default_path.clone().ok_or_else(|| {
                Error::Config("Unable to determine user home folder path.".to_string())
            })?,
        };

        let is_default_path = default_path.as_deref() == Some(path.as_path());
        Ok(Self {
            path,
            is_default_path,
        })
    }

    /// Get the default config file path
    ///
    /// Returns `~/.lsbranchrc.json`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(CONFIG_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_default_path(&self) -> bool {
        self.is_default_path
    }

    /// Load the config file
    ///
    /// A missing file yields an empty config with `exists() == false`.
    pub fn load(&self) -> Result<LoadedConfig> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Config file not found");
                return Ok(LoadedConfig::default());
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read config file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let data: ConfigFile = serde_json::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            repos = data.repos.len(),
            "Config loaded"
        );

        Ok(LoadedConfig { data, exists: true })
    }

    /// Add `repo` and save, unless its path or alias is already taken
    ///
    /// `config` is only updated once the file has been written.
    pub fn try_add_repo(&self, config: &mut LoadedConfig, repo: RepoRef) -> Result<()> {
        let taken = unique_values(&config.data.repos);
        let candidate = [
            Some(repo.path.to_string_lossy().into_owned()),
            repo.alias.clone(),
        ];

        let issues: Vec<String> = taken
            .iter()
            .zip(candidate)
            .filter_map(|((property, values), value)| {
                let value = value?;
                values
                    .iter()
                    .any(|(existing, _)| *existing == value)
                    .then(|| format!("Repo {} \"{}\" already exists", property, value))
            })
            .collect();

        if !issues.is_empty() {
            return Err(Error::Duplicate(issues));
        }

        let mut data = config.data.clone();
        data.repos.push(repo);
        self.save(&data)?;

        config.data = data;
        config.exists = true;
        Ok(())
    }

    fn save(&self, data: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut contents = serde_json::to_string_pretty(data)?;
        contents.push('\n');

        std::fs::write(&self.path, contents).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Settings for invoking git
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    /// Path to the git executable
    pub git_path: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
        }
    }
}

impl GitSettings {
    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - LSBRANCH_GIT_PATH: Path to git executable
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(git_path) = std::env::var("LSBRANCH_GIT_PATH") {
            self.git_path = git_path;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, git_path: Option<String>) -> Self {
        if let Some(path) = git_path {
            self.git_path = path;
        }

        self
    }

    /// Load settings with all overrides applied
    ///
    /// Priority: CLI > env > defaults
    pub fn load_with_overrides(git_path: Option<String>) -> Self {
        Self::default()
            .with_env_overrides()
            .with_cli_overrides(git_path)
    }
}
