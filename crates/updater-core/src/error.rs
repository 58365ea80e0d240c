use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("walk {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("resolve root {root}: {source}")]
    InvalidRoot {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("remote resolution failed: {0}")]
    RemoteResolution(String),
    #[error("`{command}` exited with status {code}: {stderr}")]
    CommandExecution {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("launch `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput { command: String, output: String },
    #[error("unresolved merge conflicts in {}", paths.join(", "))]
    UnresolvedConflicts { paths: Vec<String> },
    #[error("merge of {upstream} left HEAD at {origin}; nothing to push")]
    NotAdvanced { upstream: String, origin: String },
    #[error("prune {path}: {source}")]
    Prune {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("refusing to prune {path}: it resolves outside the repository")]
    PruneOutsideRoot { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_execution_message_names_command_and_status() {
        let err = UpdateError::CommandExecution {
            command: "git push origin HEAD".into(),
            code: 128,
            stderr: "permission denied".into(),
        };
        let message = err.to_string();
        assert!(message.contains("git push origin HEAD"));
        assert!(message.contains("128"));
        assert!(message.contains("permission denied"));
    }

    #[test]
    fn conflict_message_lists_paths() {
        let err = UpdateError::UnresolvedConflicts {
            paths: vec!["grammar.js".into(), "src/parser.c".into()],
        };
        assert_eq!(
            err.to_string(),
            "unresolved merge conflicts in grammar.js, src/parser.c"
        );
    }
}
