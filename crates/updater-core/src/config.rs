use crate::prune::{ArtifactPruneSet, DEFAULT_PRUNE_PATHS};
use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COMMIT_MESSAGE: &str = "[automated] update to latest upstream";

/// How the default branch of the origin remote is resolved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultBranchSource {
    /// Last token of the `HEAD` line in `git remote show <origin>`.
    #[default]
    RemoteShow,
    /// `git symbolic-ref --short refs/remotes/<origin>/HEAD`.
    SymbolicRef,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub git_program: String,
    pub origin_remote: String,
    pub upstream_remote: String,
    pub prune_paths: Vec<PathBuf>,
    pub commit_message: String,
    pub default_branch_source: DefaultBranchSource,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            origin_remote: "origin".to_string(),
            upstream_remote: "upstream".to_string(),
            prune_paths: DEFAULT_PRUNE_PATHS.iter().map(PathBuf::from).collect(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            default_branch_source: DefaultBranchSource::default(),
        }
    }
}

impl UpdaterConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config: Self = serde_json::from_str(&data).context("parse config")?;
        config.prune_set().context("validate prune_paths")?;
        Ok(config)
    }

    pub fn prune_set(&self) -> anyhow::Result<ArtifactPruneSet> {
        ArtifactPruneSet::new(self.prune_paths.clone())
    }
}

/// `None` when the platform has no home directory to derive one from.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "grammar-updater", "grammar-updater")
        .map(|project| project.config_dir().join("config.json"))
}
