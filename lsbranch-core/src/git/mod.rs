//! Git status resolution for lsbranch
//!
//! This module reads `.git/HEAD`, runs `git branch`, and resolves batches of
//! configured repositories concurrently.

mod batch;
mod branches;
mod head;
mod resolver;

pub use batch::{resolve_all, validate_repo_path};
pub use branches::parse_branch_listing;
pub use head::HeadRef;
pub use resolver::{GitStatusResolver, StatusResolver};
