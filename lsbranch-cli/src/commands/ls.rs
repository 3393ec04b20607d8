//! Ls command - show the checked-out branch of every configured repo

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use lsbranch_core::{resolve_all, RepoStatus, RepoStatusResult};

use super::{ensure_valid, report_error, AlreadyReported, CommandContext, TOOL_NAME};

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// If specified, present data in JSON format
    #[arg(long)]
    pub json: bool,

    /// If specified, display all local branches
    #[arg(short, long)]
    pub all: bool,
}

impl LsArgs {
    /// Execute the ls command
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let config = ctx.store.load()?;

        if !config.exists() {
            if ctx.store.is_default_path() {
                report_error(format!(
                    "No repos have been configured. Add a repo with \"{} add\"",
                    TOOL_NAME
                ));
            } else {
                report_error(format!(
                    "Config file does not exist: {}",
                    ctx.store.path().display()
                ));
            }
            return Err(AlreadyReported.into());
        }

        ensure_valid(&config)?;

        let results = resolve_all(Arc::clone(&ctx.resolver), config.repos(), self.all)
            .await
            .context("Failed to resolve repo branches")?;

        if self.json {
            println!("{}", serde_json::to_string(&results)?);
        } else {
            for line in render_table(&results, self.all) {
                println!("{}", line);
            }
        }

        Ok(())
    }
}

/// Lay out results as a two-column table
///
/// The name column holds the alias (or path) and is padded to the longest
/// name plus two spaces. Each extra branch gets its own continuation line.
pub fn render_table(results: &[RepoStatusResult], highlight_checked_out: bool) -> Vec<String> {
    let rows: Vec<(String, Vec<String>)> = results
        .iter()
        .map(|result| {
            let values = match &result.status {
                RepoStatus::Failure(e) => vec![e.to_string().red().to_string()],
                RepoStatus::Success(data) => {
                    let checked_out = if highlight_checked_out {
                        data.checked_out_branch.green().to_string()
                    } else {
                        data.checked_out_branch.clone()
                    };
                    std::iter::once(checked_out)
                        .chain(data.other_branches.iter().flatten().cloned())
                        .collect()
                }
            };
            (result.repo.display_name(), values)
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    let mut lines = Vec::new();
    for (name, values) in &rows {
        for (i, value) in values.iter().enumerate() {
            if i == 0 {
                let padding = " ".repeat(name_width - name.chars().count());
                lines.push(format!("{}{}{}", name, padding, value));
            } else {
                lines.push(format!("{}{}", " ".repeat(name_width), value));
            }
        }
    }
    lines
}
