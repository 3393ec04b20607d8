//! `git branch` output parsing

use crate::status::{RepoData, RepoError};

/// Parse the stdout of `git branch` into the checked-out branch and the rest
///
/// Lines starting with `*` mark the checked-out branch; every other non-blank
/// line is another local branch, kept in the order git printed it. Exactly one
/// marked line is required.
pub fn parse_branch_listing(stdout: &str) -> Result<RepoData, RepoError> {
    let mut checked_out = Vec::new();
    let mut others = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix('*') {
            Some(branch) => checked_out.push(branch.trim().to_string()),
            None => others.push(line.to_string()),
        }
    }

    match checked_out.len() {
        0 => Err(RepoError::NoCheckedOutBranch),
        1 => Ok(RepoData::with_other_branches(checked_out.remove(0), others)),
        _ => Err(RepoError::MultipleCheckedOutBranches(checked_out)),
    }
}
