use crate::config::{DefaultBranchSource, UpdaterConfig};
use crate::error::UpdateError;
use crate::git::Git;
use crate::model::BranchDivergence;
use tracing::debug;

/// Works out the default branch and how far `origin` trails `upstream` on it.
pub struct DivergenceAnalyzer<'a> {
    origin: &'a str,
    upstream: &'a str,
    source: DefaultBranchSource,
}

impl<'a> DivergenceAnalyzer<'a> {
    pub fn new(config: &'a UpdaterConfig) -> Self {
        Self {
            origin: &config.origin_remote,
            upstream: &config.upstream_remote,
            source: config.default_branch_source,
        }
    }

    pub fn analyze(&self, git: &Git<'_>) -> Result<BranchDivergence, UpdateError> {
        self.ensure_remotes(git)?;
        let default_branch = self.default_branch(git)?;
        debug!(
            path = %git.workdir().display(),
            default_branch = %default_branch,
            "resolved default branch"
        );

        git.remote_update()?;

        let range = format!(
            "{upstream}/{branch}...{origin}/{branch}",
            upstream = self.upstream,
            origin = self.origin,
            branch = default_branch,
        );
        let output = git.rev_list_left_right_count(&range)?;
        let (commits_behind, commits_ahead) =
            parse_left_right_count(&output).ok_or_else(|| UpdateError::UnexpectedOutput {
                command: format!("git rev-list --left-right --count {range}"),
                output: output.clone(),
            })?;

        Ok(BranchDivergence {
            default_branch,
            commits_ahead,
            commits_behind,
        })
    }

    fn ensure_remotes(&self, git: &Git<'_>) -> Result<(), UpdateError> {
        let remotes = git.remotes()?;
        for required in [self.origin, self.upstream] {
            if !remotes.iter().any(|remote| remote == required) {
                return Err(UpdateError::RemoteResolution(format!(
                    "remote `{required}` is not configured"
                )));
            }
        }
        Ok(())
    }

    fn default_branch(&self, git: &Git<'_>) -> Result<String, UpdateError> {
        let resolved = match self.source {
            DefaultBranchSource::RemoteShow => {
                parse_remote_show_head(&git.remote_show(self.origin)?)
            }
            DefaultBranchSource::SymbolicRef => {
                parse_symbolic_ref(&git.remote_head_ref(self.origin)?, self.origin)
            }
        };
        resolved.ok_or_else(|| {
            UpdateError::RemoteResolution(format!(
                "HEAD of remote `{}` does not name a branch",
                self.origin
            ))
        })
    }
}

/// Last token of the `HEAD branch` line in `git remote show <remote>` output.
pub fn parse_remote_show_head(output: &str) -> Option<String> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("HEAD branch"))?;
    let token = line.split_whitespace().last()?;
    if token.is_empty() || token.ends_with(':') || token == "(unknown)" {
        return None;
    }
    Some(token.to_string())
}

/// Strips the `<remote>/` prefix from `git symbolic-ref --short` output.
pub fn parse_symbolic_ref(output: &str, remote: &str) -> Option<String> {
    let branch = output.trim().strip_prefix(remote)?.strip_prefix('/')?;
    if branch.is_empty() {
        None
    } else {
        Some(branch.to_string())
    }
}

/// Parses `<left>\t<right>` from `git rev-list --left-right --count`.
pub fn parse_left_right_count(output: &str) -> Option<(u32, u32)> {
    let mut counts = output.split_whitespace().map(|value| value.parse::<u32>());
    let left = counts.next()?.ok()?;
    let right = counts.next()?.ok()?;
    if counts.next().is_some() {
        return None;
    }
    Some((left, right))
}
