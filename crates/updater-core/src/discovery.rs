use crate::error::UpdateError;
use crate::model::RepositoryHandle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::{DirEntry, WalkDir};

pub const GIT_METADATA_DIR: &str = ".git";

/// Lazily walks `root` and yields every directory that directly contains a
/// `.git` directory. Entries come back sorted by file name at each level.
pub struct RepositoryDiscovery {
    root: PathBuf,
    walker: walkdir::IntoIter,
}

impl RepositoryDiscovery {
    pub fn new(root: &Path) -> Result<Self, UpdateError> {
        let root = fs::canonicalize(root).map_err(|source| UpdateError::InvalidRoot {
            root: root.to_path_buf(),
            source,
        })?;
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Ok(Self { root, walker })
    }
}

impl Iterator for RepositoryDiscovery {
    type Item = Result<RepositoryHandle, UpdateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(UpdateError::Discovery {
                        root: self.root.clone(),
                        source,
                    }));
                }
            };
            if !is_metadata_dir(&entry) {
                continue;
            }
            // Nothing inside .git is a working tree.
            self.walker.skip_current_dir();
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            let handle = RepositoryHandle::new(parent.to_path_buf());
            info!(path = %handle, "found repository");
            return Some(Ok(handle));
        }
    }
}

fn is_metadata_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == GIT_METADATA_DIR
}

/// Collects every repository under `root`, failing on the first traversal error.
pub fn find_repositories(root: &Path) -> Result<Vec<RepositoryHandle>, UpdateError> {
    RepositoryDiscovery::new(root)?.collect()
}
