use crate::invoker::ToolInvoker;
use crate::search::permutations::{permutation_count, Permutations};
use crate::search::{classify, Outcome, RoleAssignment, SearchResult, TrialRecord};
use crate::staging::FileSet;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Snapshot handed to the progress callback after every trial.
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress<'a> {
    pub trials_run: usize,
    pub total_trials: u64,
    pub record: &'a TrialRecord,
}

type ProgressCallback = Box<dyn Fn(&SearchProgress<'_>) + Send + Sync>;

/// Brute-force discovery of which file is SAM, SYSTEM and SECURITY.
///
/// Every ordering of the file set is tried in turn, one blocking tool run at a
/// time, until the output of a run classifies as recovered credentials. The
/// worst case is `n!` runs for `n` files. Only the first three positions of an
/// ordering matter, so many runs repeat an earlier triple; that redundancy is
/// accepted for the handful of files this is meant for.
pub struct RoleSearch {
    invoker: ToolInvoker,
    stop_on_missing_tool: bool,
    progress_callback: Option<ProgressCallback>,
}

impl RoleSearch {
    pub fn new(invoker: ToolInvoker) -> Self {
        Self {
            invoker,
            stop_on_missing_tool: false,
            progress_callback: None,
        }
    }

    pub fn with_stop_on_missing_tool(mut self, stop: bool) -> Self {
        self.stop_on_missing_tool = stop;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SearchProgress<'_>) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Upper bound on tool runs for this file set.
    pub fn total_trials(file_set: &FileSet) -> u64 {
        if file_set.len() < 2 {
            0
        } else {
            permutation_count(file_set.len())
        }
    }

    /// The role assignments `search` would try, in order.
    pub fn plan(file_set: &FileSet) -> impl Iterator<Item = RoleAssignment<'_>> {
        Permutations::new(file_set.len())
            .filter_map(move |ordering| RoleAssignment::from_ordering(file_set, &ordering))
    }

    pub fn search(&self, file_set: &FileSet) -> SearchResult {
        let total_trials = Self::total_trials(file_set);
        info!(files = file_set.len(), total_trials, "starting role search");

        let folded = Self::plan(file_set).try_fold(Vec::new(), |mut attempts, assignment| {
            let result = self.invoker.invoke(
                &assignment.sam.path,
                &assignment.system.path,
                &assignment.security.path,
            );
            let outcome = classify(&result.stdout, &result.stderr);

            match &outcome {
                Outcome::Success => info!(assignment = %assignment.describe(), "trial succeeded"),
                Outcome::Fail(reason) => debug!(
                    assignment = %assignment.describe(),
                    exit_code = result.exit_code,
                    reason = %reason,
                    "trial failed"
                ),
            }

            attempts.push(TrialRecord::new(&assignment, outcome));
            self.report_progress(&attempts, total_trials);

            if attempts.last().is_some_and(|record| record.outcome.is_success()) {
                return ControlFlow::Break(SearchResult::succeeded(result.stdout, attempts));
            }
            if self.stop_on_missing_tool && result.is_tool_missing() {
                warn!(
                    tool = self.invoker.executable(),
                    "extraction tool missing; abandoning remaining trials"
                );
                return ControlFlow::Break(SearchResult::exhausted(attempts));
            }
            ControlFlow::Continue(attempts)
        });

        match folded {
            ControlFlow::Break(result) => result,
            ControlFlow::Continue(attempts) => {
                info!(attempts = attempts.len(), "role search exhausted");
                SearchResult::exhausted(attempts)
            }
        }
    }

    fn report_progress(&self, attempts: &[TrialRecord], total_trials: u64) {
        if let (Some(callback), Some(record)) = (&self.progress_callback, attempts.last()) {
            callback(&SearchProgress {
                trials_run: attempts.len(),
                total_trials,
                record,
            });
        }
    }
}
