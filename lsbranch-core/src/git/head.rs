//! `.git/HEAD` parsing

const REF_PREFIX: &str = "ref: ";

/// What `.git/HEAD` points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRef {
    /// A symbolic ref such as `refs/heads/feature/foo`, holding the branch
    /// name with the `refs/heads/` segment removed
    Branch(String),
    /// A detached HEAD holding the raw commit SHA
    Detached(String),
}

impl HeadRef {
    /// Parse the raw contents of a `.git/HEAD` file
    ///
    /// The file can look like:
    /// ```text
    /// ref: refs/heads/branchname
    /// ```
    /// or it can contain a commit SHA. Everything up to and including the
    /// second `/` of a symbolic ref is dropped, so branch names containing
    /// `/` survive intact. A ref with fewer than two `/` yields an empty name.
    pub fn parse(contents: &str) -> Self {
        match contents.strip_prefix(REF_PREFIX) {
            Some(reference) => {
                let reference = reference.trim();
                let mut slashes = reference.match_indices('/').map(|(idx, _)| idx);
                let name = match (slashes.next(), slashes.next()) {
                    (Some(_), Some(second)) => &reference[second + 1..],
                    _ => "",
                };
                Self::Branch(name.to_string())
            }
            None => Self::Detached(contents.trim().to_string()),
        }
    }

    /// The branch name, or the SHA for a detached HEAD
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Detached(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Branch(name) | Self::Detached(name) => name,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }
}
