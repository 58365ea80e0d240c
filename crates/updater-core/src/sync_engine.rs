use crate::command::CommandRunner;
use crate::config::UpdaterConfig;
use crate::divergence::DivergenceAnalyzer;
use crate::error::UpdateError;
use crate::git::{Git, MergeStatus};
use crate::model::RepositoryHandle;
use crate::prune::ArtifactPruneSet;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum SyncOutcome {
    UpToDate,
    Updated {
        commits_behind: u32,
        committed: bool,
        pruned: usize,
    },
    Failed(UpdateError),
}

impl SyncOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::UpToDate => "up_to_date",
            SyncOutcome::Updated { .. } => "updated",
            SyncOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::UpToDate => f.write_str("up to date"),
            SyncOutcome::Updated {
                commits_behind,
                committed,
                pruned,
            } => {
                write!(f, "updated ({commits_behind} upstream commits")?;
                if *committed {
                    f.write_str(", committed")?;
                }
                if *pruned > 0 {
                    write!(f, ", {pruned} artifacts pruned")?;
                }
                f.write_str(")")
            }
            SyncOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Brings one repository's default branch up to date with its upstream.
pub struct SyncEngine<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a UpdaterConfig,
    prune_set: ArtifactPruneSet,
}

impl<'a> SyncEngine<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a UpdaterConfig) -> anyhow::Result<Self> {
        Ok(Self {
            runner,
            config,
            prune_set: config.prune_set()?,
        })
    }

    pub fn sync(&self, repo: &RepositoryHandle) -> SyncOutcome {
        match self.try_sync(repo) {
            Ok(outcome) => outcome,
            Err(err) => SyncOutcome::Failed(err),
        }
    }

    fn try_sync(&self, repo: &RepositoryHandle) -> Result<SyncOutcome, UpdateError> {
        debug!(path = %repo, "updating repository");
        let git = Git::new(self.runner, &self.config.git_program, repo.path());

        git.clean()?;

        let divergence = DivergenceAnalyzer::new(self.config).analyze(&git)?;
        info!(
            path = %repo,
            default_branch = %divergence.default_branch,
            ahead = divergence.commits_ahead,
            behind = divergence.commits_behind,
            "repository divergence"
        );
        if !divergence.is_behind() {
            return Ok(SyncOutcome::UpToDate);
        }

        let head_before = git.head()?;
        let upstream_ref = format!(
            "{}/{}",
            self.config.upstream_remote, divergence.default_branch
        );
        let merge = git.merge_no_commit(&upstream_ref)?;
        if merge == MergeStatus::Conflicted {
            warn!(path = %repo, upstream = %upstream_ref, "merge reported conflicts");
        }

        let pruned = self.prune_set.prune(repo.path())?;
        if !pruned.is_empty() {
            debug!(path = %repo, pruned = ?pruned, "removed binding artifacts");
        }

        if merge == MergeStatus::Conflicted {
            let paths = git.unmerged_paths()?;
            if !paths.is_empty() {
                return Err(UpdateError::UnresolvedConflicts { paths });
            }
        }

        git.add_all()?;
        let committed = if git.is_dirty()? {
            debug!(path = %repo, "working tree dirty; committing changes");
            git.commit(&self.config.commit_message)?;
            true
        } else {
            debug!(path = %repo, "working tree clean after merge");
            false
        };

        let origin_ref = format!(
            "{}/{}",
            self.config.origin_remote, divergence.default_branch
        );
        let needs_push = committed
            || git.head()? != head_before
            || git.commits_between(&format!("{origin_ref}..HEAD"))? > 0;
        if !needs_push {
            return Err(UpdateError::NotAdvanced {
                upstream: upstream_ref,
                origin: origin_ref,
            });
        }

        git.push_head(&self.config.origin_remote)?;
        info!(path = %repo, "updated repository");
        Ok(SyncOutcome::Updated {
            commits_behind: divergence.commits_behind,
            committed,
            pruned: pruned.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::testing::{ScriptedRunner, remote_show_output};
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Clone, Copy)]
    struct Script {
        behind: u32,
        merge_status: i32,
        fast_forward: bool,
        unmerged: &'static str,
        unpushed: u32,
    }

    impl Default for Script {
        fn default() -> Self {
            Self {
                behind: 3,
                merge_status: 0,
                fast_forward: false,
                unmerged: "",
                unpushed: 0,
            }
        }
    }

    /// Status reports dirty when a `dirty` marker exists, or when `had-cargo` marks a
    /// `Cargo.toml` that has since been pruned.
    fn scripted(script: Script) -> ScriptedRunner {
        let merged = Rc::new(Cell::new(false));
        ScriptedRunner::new(move |workdir, args| {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            match args.as_slice() {
                ["remote"] => CommandOutput::success("origin\nupstream\n"),
                ["remote", "show", "origin"] => CommandOutput::success(remote_show_output("main")),
                ["rev-list", "--count", _] => {
                    CommandOutput::success(format!("{}\n", script.unpushed))
                }
                ["rev-list", ..] => CommandOutput::success(format!("{}\t0\n", script.behind)),
                ["rev-parse", "HEAD"] => {
                    if merged.get() && script.fast_forward {
                        CommandOutput::success("bbbb\n")
                    } else {
                        CommandOutput::success("aaaa\n")
                    }
                }
                ["merge", ..] => {
                    merged.set(true);
                    if script.merge_status == 0 {
                        CommandOutput::success("")
                    } else {
                        CommandOutput::failure(script.merge_status, "merge failed")
                    }
                }
                ["diff", "--name-only", "--diff-filter=U"] => {
                    CommandOutput::success(script.unmerged)
                }
                ["status", "--porcelain"] => {
                    let pruned_cargo = workdir.join("had-cargo").exists()
                        && !workdir.join("Cargo.toml").exists();
                    let dirty = workdir.join("dirty").exists() || pruned_cargo;
                    CommandOutput::success(if dirty { " M grammar.js\n" } else { "" })
                }
                _ => CommandOutput::success(""),
            }
        })
    }

    fn run(runner: &ScriptedRunner, root: &Path) -> SyncOutcome {
        let config = UpdaterConfig::default();
        let engine = SyncEngine::new(runner, &config).unwrap();
        engine.sync(&RepositoryHandle::new(root.to_path_buf()))
    }

    fn verbs(runner: &ScriptedRunner) -> Vec<String> {
        runner
            .calls()
            .into_iter()
            .map(|call| call.args.join(" "))
            .collect()
    }

    #[test]
    fn up_to_date_repository_skips_merge_commit_and_push() {
        let tmp = TempDir::new().unwrap();
        let runner = scripted(Script {
            behind: 0,
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        assert!(matches!(outcome, SyncOutcome::UpToDate));
        assert_eq!(runner.count("clean"), 1);
        assert_eq!(runner.count("merge"), 0);
        assert_eq!(runner.count("commit"), 0);
        assert_eq!(runner.count("push"), 0);
    }

    #[test]
    fn behind_repository_is_merged_pruned_committed_and_pushed() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("bindings/rust")).unwrap();
        fs::write(tmp.path().join("bindings/rust/lib.rs"), "").unwrap();
        fs::write(tmp.path().join("dirty"), "").unwrap();
        let runner = scripted(Script::default());

        let outcome = run(&runner, tmp.path());

        match outcome {
            SyncOutcome::Updated {
                commits_behind,
                committed,
                pruned,
            } => {
                assert_eq!(commits_behind, 3);
                assert!(committed);
                assert_eq!(pruned, 1);
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert!(!tmp.path().join("bindings/rust").exists());
        let verbs = verbs(&runner);
        let expected_tail = [
            "merge --ff --no-commit upstream/main",
            "add --all",
            "status --porcelain",
            "commit -m [automated] update to latest upstream",
            "push origin HEAD",
        ];
        assert_eq!(verbs[verbs.len() - expected_tail.len()..], expected_tail);
        assert_eq!(verbs[0], "clean -f -d");
    }

    #[test]
    fn merge_that_changes_nothing_fails_instead_of_reporting_up_to_date() {
        let tmp = TempDir::new().unwrap();
        let runner = scripted(Script::default());

        let outcome = run(&runner, tmp.path());

        match outcome {
            SyncOutcome::Failed(UpdateError::NotAdvanced { upstream, origin }) => {
                assert_eq!(upstream, "upstream/main");
                assert_eq!(origin, "origin/main");
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert_eq!(runner.count("merge"), 1);
        assert_eq!(runner.count("commit"), 0);
        assert_eq!(runner.count("push"), 0);
        assert!(verbs(&runner).contains(&"rev-list --count origin/main..HEAD".to_string()));
    }

    #[test]
    fn merged_but_unpushed_head_is_pushed_on_the_next_run() {
        let tmp = TempDir::new().unwrap();
        let runner = scripted(Script {
            unpushed: 2,
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        assert!(matches!(
            outcome,
            SyncOutcome::Updated {
                commits_behind: 3,
                committed: false,
                ..
            }
        ));
        assert_eq!(runner.count("commit"), 0);
        assert_eq!(runner.count("push"), 1);
        let verbs = verbs(&runner);
        assert_eq!(
            verbs[verbs.len() - 2..],
            ["rev-list --count origin/main..HEAD", "push origin HEAD"]
        );
    }

    #[test]
    fn fast_forward_without_commit_is_still_pushed() {
        let tmp = TempDir::new().unwrap();
        let runner = scripted(Script {
            fast_forward: true,
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        assert!(matches!(
            outcome,
            SyncOutcome::Updated {
                committed: false,
                ..
            }
        ));
        assert_eq!(runner.count("commit"), 0);
        assert_eq!(runner.count("push"), 1);
    }

    #[test]
    fn unresolved_conflicts_stop_before_staging() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "[package]").unwrap();
        let runner = scripted(Script {
            merge_status: 1,
            unmerged: "src/parser.c\n",
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        match outcome {
            SyncOutcome::Failed(UpdateError::UnresolvedConflicts { paths }) => {
                assert_eq!(paths, vec!["src/parser.c"]);
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert!(!tmp.path().join("Cargo.toml").exists());
        assert_eq!(runner.count("add"), 0);
        assert_eq!(runner.count("commit"), 0);
        assert_eq!(runner.count("push"), 0);
    }

    #[test]
    fn conflict_status_without_unmerged_paths_continues() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dirty"), "").unwrap();
        let runner = scripted(Script {
            merge_status: 1,
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        assert!(matches!(outcome, SyncOutcome::Updated { committed: true, .. }));
    }

    #[test]
    fn fatal_merge_status_fails_the_repository() {
        let tmp = TempDir::new().unwrap();
        let runner = scripted(Script {
            merge_status: 128,
            ..Script::default()
        });

        let outcome = run(&runner, tmp.path());

        assert!(matches!(
            outcome,
            SyncOutcome::Failed(UpdateError::CommandExecution { code: 128, .. })
        ));
        assert_eq!(runner.count("add"), 0);
    }

    #[test]
    fn pruning_alone_produces_a_commit() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "[package]").unwrap();
        fs::write(tmp.path().join("had-cargo"), "").unwrap();
        let runner = scripted(Script::default());

        let outcome = run(&runner, tmp.path());

        assert!(matches!(
            outcome,
            SyncOutcome::Updated {
                committed: true,
                pruned: 1,
                ..
            }
        ));
        assert_eq!(runner.count("push"), 1);
    }

    #[test]
    fn outcome_display_is_readable() {
        let outcome = SyncOutcome::Updated {
            commits_behind: 3,
            committed: true,
            pruned: 2,
        };
        assert_eq!(
            outcome.to_string(),
            "updated (3 upstream commits, committed, 2 artifacts pruned)"
        );
        assert_eq!(SyncOutcome::UpToDate.as_str(), "up_to_date");
    }
}
