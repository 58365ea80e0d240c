use std::fmt;
use std::path::{Path, PathBuf};

/// Absolute root of one discovered repository.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RepositoryHandle {
    root: PathBuf,
}

impl RepositoryHandle {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

/// Ahead/behind relationship between `origin/<branch>` and `upstream/<branch>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BranchDivergence {
    pub default_branch: String,
    pub commits_ahead: u32,
    pub commits_behind: u32,
}

impl BranchDivergence {
    pub fn is_behind(&self) -> bool {
        self.commits_behind > 0
    }
}
