use crate::command::{CommandOutput, CommandRunner};
use crate::error::UpdateError;
use std::path::Path;

/// Exit status of `git merge` that signals conflicts left in the tree.
pub const MERGE_CONFLICT_STATUS: i32 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeStatus {
    Clean,
    Conflicted,
}

/// Git operations bound to one repository root.
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a str,
    workdir: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &'a str, workdir: &'a Path) -> Self {
        Self {
            runner,
            program,
            workdir,
        }
    }

    pub fn workdir(&self) -> &Path {
        self.workdir
    }

    pub fn run(&self, args: &[&str]) -> Result<CommandOutput, UpdateError> {
        self.runner.run(self.workdir, self.program, args)
    }

    pub fn run_accepting(
        &self,
        args: &[&str],
        accepted: &[i32],
    ) -> Result<CommandOutput, UpdateError> {
        self.runner
            .run_accepting(self.workdir, self.program, args, accepted)
    }

    pub fn clean(&self) -> Result<(), UpdateError> {
        self.run(&["clean", "-f", "-d"]).map(|_| ())
    }

    pub fn remotes(&self) -> Result<Vec<String>, UpdateError> {
        let output = self.run(&["remote"])?;
        Ok(non_empty_lines(&output.stdout))
    }

    pub fn remote_show(&self, remote: &str) -> Result<String, UpdateError> {
        Ok(self.run(&["remote", "show", remote])?.stdout)
    }

    pub fn remote_head_ref(&self, remote: &str) -> Result<String, UpdateError> {
        let reference = format!("refs/remotes/{remote}/HEAD");
        let output = self.run(&["symbolic-ref", "--short", &reference])?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn remote_update(&self) -> Result<(), UpdateError> {
        self.run(&["remote", "update"]).map(|_| ())
    }

    pub fn rev_list_left_right_count(&self, range: &str) -> Result<String, UpdateError> {
        Ok(self
            .run(&["rev-list", "--left-right", "--count", range])?
            .stdout)
    }

    /// Counts commits in `range`, e.g. `origin/main..HEAD`.
    pub fn commits_between(&self, range: &str) -> Result<u32, UpdateError> {
        let output = self.run(&["rev-list", "--count", range])?;
        output
            .stdout
            .trim()
            .parse()
            .map_err(|_| UpdateError::UnexpectedOutput {
                command: format!("rev-list --count {range}"),
                output: output.stdout.clone(),
            })
    }

    pub fn head(&self) -> Result<String, UpdateError> {
        Ok(self.run(&["rev-parse", "HEAD"])?.stdout.trim().to_string())
    }

    pub fn merge_no_commit(&self, reference: &str) -> Result<MergeStatus, UpdateError> {
        let output = self.run_accepting(
            &["merge", "--ff", "--no-commit", reference],
            &[0, MERGE_CONFLICT_STATUS],
        )?;
        Ok(if output.status == Some(MERGE_CONFLICT_STATUS) {
            MergeStatus::Conflicted
        } else {
            MergeStatus::Clean
        })
    }

    pub fn unmerged_paths(&self) -> Result<Vec<String>, UpdateError> {
        let output = self.run(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(non_empty_lines(&output.stdout))
    }

    pub fn add_all(&self) -> Result<(), UpdateError> {
        self.run(&["add", "--all"]).map(|_| ())
    }

    pub fn is_dirty(&self) -> Result<bool, UpdateError> {
        let output = self.run(&["status", "--porcelain"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    pub fn commit(&self, message: &str) -> Result<(), UpdateError> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    pub fn push_head(&self, remote: &str) -> Result<(), UpdateError> {
        self.run(&["push", remote, "HEAD"]).map(|_| ())
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
