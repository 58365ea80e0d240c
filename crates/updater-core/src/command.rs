use crate::error::UpdateError;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Captured result of one external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.status.unwrap_or(-1)
    }
}

/// Executes external programs with the working directory scoped to a single call.
pub trait CommandRunner {
    fn spawn(&self, workdir: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    fn run(
        &self,
        workdir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, UpdateError> {
        self.run_accepting(workdir, program, args, &[0])
    }

    fn run_accepting(
        &self,
        workdir: &Path,
        program: &str,
        args: &[&str],
        accepted: &[i32],
    ) -> Result<CommandOutput, UpdateError> {
        let output = self
            .spawn(workdir, program, args)
            .map_err(|source| UpdateError::CommandSpawn {
                command: render_command(program, args),
                source,
            })?;
        match output.status {
            Some(code) if accepted.contains(&code) => Ok(output),
            _ => Err(UpdateError::CommandExecution {
                command: render_command(program, args),
                code: output.code(),
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }
}

pub fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Runs real processes through `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn spawn(&self, workdir: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        debug!(
            workdir = %workdir.display(),
            command = %render_command(program, args),
            "running command"
        );
        let output = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
