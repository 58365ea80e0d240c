use crate::discovery::find_repositories;
use crate::error::UpdateError;
use crate::model::RepositoryHandle;
use crate::sync_engine::{SyncEngine, SyncOutcome};
use std::path::Path;
use tracing::{info, warn};

pub type RepoProgressReporter<'a> = dyn Fn(&RepositoryHandle, &SyncOutcome) + 'a;

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct SyncSummary {
    pub up_to_date: u32,
    pub updated: u32,
    pub failed: u32,
}

impl SyncSummary {
    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::UpToDate => self.up_to_date += 1,
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.up_to_date + self.updated + self.failed
    }
}

#[derive(Debug)]
pub struct RepoReport {
    pub repo: RepositoryHandle,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<RepoReport>,
    pub summary: SyncSummary,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    fn push(&mut self, repo: RepositoryHandle, outcome: SyncOutcome) {
        self.summary.record(&outcome);
        self.results.push(RepoReport { repo, outcome });
    }
}

/// Runs the sync engine over every repository under a root, one at a time.
pub struct BatchOrchestrator<'a> {
    engine: SyncEngine<'a>,
    progress: Option<&'a RepoProgressReporter<'a>>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(engine: SyncEngine<'a>) -> Self {
        Self {
            engine,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a RepoProgressReporter<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Only discovery errors escape; each repository's failure is recorded in the report.
    pub fn run(&self, root: &Path) -> Result<BatchReport, UpdateError> {
        let repos = find_repositories(root)?;
        info!(
            root = %root.display(),
            repos = repos.len(),
            "starting update batch"
        );

        let mut report = BatchReport::default();
        for repo in repos {
            let outcome = self.engine.sync(&repo);
            match &outcome {
                SyncOutcome::Failed(err) => {
                    warn!(path = %repo, error = %err, "repository update failed");
                }
                other => {
                    info!(path = %repo, outcome = other.as_str(), "repository update outcome");
                }
            }
            if let Some(progress) = self.progress {
                progress(&repo, &outcome);
            }
            report.push(repo, outcome);
        }

        info!(
            up_to_date = report.summary.up_to_date,
            updated = report.summary.updated,
            failed = report.summary.failed,
            "update batch finished"
        );
        Ok(report)
    }
}
