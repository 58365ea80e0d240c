use crate::command::{CommandOutput, CommandRunner};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RecordedCall {
    pub(crate) workdir: PathBuf,
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
}

type Script = dyn Fn(&Path, &[String]) -> CommandOutput;

/// In-memory runner that answers every invocation from a script and records it.
pub(crate) struct ScriptedRunner {
    script: Box<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(&Path, &[String]) -> CommandOutput + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose first argument is `verb`.
    pub(crate) fn count(&self, verb: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.args.first().map(String::as_str) == Some(verb))
            .count()
    }

    pub(crate) fn count_in(&self, workdir: &Path, verb: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.workdir == workdir)
            .filter(|call| call.args.first().map(String::as_str) == Some(verb))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn spawn(&self, workdir: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.calls.lock().unwrap().push(RecordedCall {
            workdir: workdir.to_path_buf(),
            program: program.to_string(),
            args: args.clone(),
        });
        Ok((self.script)(workdir, &args))
    }
}

/// `git remote show origin` output pointing HEAD at `branch`.
pub(crate) fn remote_show_output(branch: &str) -> String {
    format!(
        "* remote origin\n  Fetch URL: git@example.com:grammars/tree-sitter-x.git\n  \
         Push  URL: git@example.com:grammars/tree-sitter-x.git\n  HEAD branch: {branch}\n  \
         Remote branch:\n    {branch} tracked\n"
    )
}
