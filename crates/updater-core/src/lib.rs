//! Keeps a tree of vendored grammar repositories in step with their upstreams.

pub mod batch;
pub mod command;
pub mod config;
pub mod discovery;
pub mod divergence;
pub mod error;
pub mod git;
pub mod model;
pub mod prune;
pub mod sync_engine;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchOrchestrator, BatchReport, RepoReport, SyncSummary};
pub use command::{CommandOutput, CommandRunner, ProcessRunner};
pub use config::UpdaterConfig;
pub use error::UpdateError;
pub use model::{BranchDivergence, RepositoryHandle};
pub use sync_engine::{SyncEngine, SyncOutcome};
