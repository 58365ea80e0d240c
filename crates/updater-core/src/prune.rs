use crate::error::UpdateError;
use anyhow::bail;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_PRUNE_PATHS: [&str; 3] = ["bindings/rust", "Cargo.toml", "Cargo.lock"];

/// Generated binding artifacts removed from every merged repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactPruneSet {
    paths: Vec<PathBuf>,
}

impl ArtifactPruneSet {
    /// Every path must stay inside the repository it is applied to.
    pub fn new(paths: Vec<PathBuf>) -> anyhow::Result<Self> {
        for path in &paths {
            validate_relative(path)?;
        }
        Ok(Self { paths })
    }

    /// Deletes whichever configured paths exist under `root`, returning the ones removed.
    ///
    /// A target whose parent resolves outside `root` through a symlink is refused.
    pub fn prune(&self, root: &Path) -> Result<Vec<PathBuf>, UpdateError> {
        let root = fs::canonicalize(root).map_err(|source| UpdateError::Prune {
            path: root.to_path_buf(),
            source,
        })?;
        let mut removed = Vec::new();
        for relative in &self.paths {
            let target = root.join(relative);
            let metadata = match fs::symlink_metadata(&target) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(UpdateError::Prune { path: target, source }),
            };
            ensure_inside(&root, &target)?;
            let result = if metadata.is_dir() {
                fs::remove_dir_all(&target)
            } else {
                fs::remove_file(&target)
            };
            result.map_err(|source| UpdateError::Prune {
                path: target.clone(),
                source,
            })?;
            removed.push(relative.clone());
        }
        Ok(removed)
    }
}

impl Default for ArtifactPruneSet {
    fn default() -> Self {
        Self {
            paths: DEFAULT_PRUNE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

fn ensure_inside(root: &Path, target: &Path) -> Result<(), UpdateError> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    let parent = fs::canonicalize(parent).map_err(|source| UpdateError::Prune {
        path: target.to_path_buf(),
        source,
    })?;
    if parent.starts_with(root) {
        Ok(())
    } else {
        Err(UpdateError::PruneOutsideRoot {
            path: target.to_path_buf(),
        })
    }
}

fn validate_relative(path: &Path) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() {
        bail!("prune path must not be empty");
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => bail!(
                "prune path {} must be relative to the repository root",
                path.display()
            ),
        }
    }
    Ok(())
}
