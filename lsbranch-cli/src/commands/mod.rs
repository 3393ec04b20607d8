//! CLI command implementations

pub mod add;
pub mod ls;

use std::fmt;
use std::sync::Arc;

use colored::Colorize;
use lsbranch_core::{ConfigStore, GitStatusResolver, LoadedConfig};

pub use add::AddArgs;
pub use ls::LsArgs;

/// Name of the installed binary, used in hints
pub const TOOL_NAME: &str = "lsbranch";

/// Shared state handed to every command
#[derive(Debug)]
pub struct CommandContext {
    pub store: ConfigStore,
    pub resolver: Arc<GitStatusResolver>,
}

/// The command already printed its error; exit non-zero without repeating it
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for AlreadyReported {}

/// Print an error line to stderr
pub fn report_error(message: impl AsRef<str>) {
    eprintln!("{}", message.as_ref().red());
}

/// Print every duplicate path or alias; fails if there were any
pub fn ensure_valid(config: &LoadedConfig) -> anyhow::Result<()> {
    let duplicates = config.validate();
    if duplicates.is_empty() {
        return Ok(());
    }

    for duplicate in &duplicates {
        report_error(duplicate.to_string());
    }
    report_error("Found config validation errors.");
    Err(AlreadyReported.into())
}
