pub mod cli;
pub mod config;
pub mod error;
pub mod invoker;
pub mod report;
pub mod search;
pub mod server;
pub mod staging;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, SearchConfig, ServerConfig, StagingConfig, ToolConfig};
pub use error::{HiveProbeError, Result, UserFriendlyError};

// Core functionality re-exports
pub use invoker::{ProcessRunner, ToolCommand, ToolInvoker, ToolRunner, TrialResult};
pub use report::ProbeReport;
pub use search::{classify, Outcome, RoleSearch, SearchResult, TrialRecord};
pub use staging::{FileSet, StagedFileSet};
pub use ui::{CleanupGuard, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Main library interface for probing local hive exports
pub struct HiveProbe {
    config: Config,
    invoker: ToolInvoker,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    cleanup: CleanupGuard,
}

impl HiveProbe {
    /// Create a new HiveProbe instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let cleanup = CleanupGuard::new()?;
        Ok(Self::with_guard(config, output_mode, verbose, quiet, cleanup))
    }

    /// Create a HiveProbe instance without installing a Ctrl+C handler
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_guard(config, output_mode, verbose, quiet, CleanupGuard::new_for_test())
    }

    fn with_guard(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        cleanup: CleanupGuard,
    ) -> Self {
        let invoker = ToolInvoker::new(config.tool.clone());
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(output_mode == OutputMode::Human && !quiet);

        Self {
            config,
            invoker,
            output_formatter,
            progress_manager,
            cleanup,
        }
    }

    /// Create HiveProbe instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Replace the process runner, e.g. with a stub in tests
    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.invoker = ToolInvoker::with_runner(self.config.tool.clone(), runner);
        self
    }

    /// Stage copies of `paths`, search their role assignments and clean up.
    pub fn probe_files(&self, paths: &[PathBuf]) -> Result<ProbeReport> {
        let started = Instant::now();

        let staged = StagedFileSet::from_paths(paths, self.config.staging.base_directory.as_deref())?;
        self.cleanup.register(staged.directory());

        let file_set = staged.file_set();
        let total = RoleSearch::total_trials(file_set);
        self.output_formatter.start_operation(&format!(
            "Probing {} files with {} (up to {} trials)",
            file_set.len(),
            self.invoker.executable(),
            total
        ));

        let progress = self.progress_manager.create_trial_progress(total);
        let search = self.role_search().with_progress({
            let pb = progress.clone();
            move |update: &search::SearchProgress<'_>| {
                ui::progress::update_trial_progress(&pb, update);
            }
        });

        let result = search.search(file_set);

        let summary = if result.success {
            "Roles identified"
        } else {
            "No assignment produced hashes"
        };
        ui::progress::finish_progress_with_summary(&progress, summary, started.elapsed());

        let report = ProbeReport::new(result, file_set, started.elapsed());

        self.cleanup.unregister(staged.directory());
        if let Err(e) = staged.close() {
            warn!(error = %e, "failed to remove staging directory");
        }

        Ok(report)
    }

    /// Role assignments a probe of `paths` would try, in order, without running anything.
    pub fn plan(&self, paths: &[PathBuf]) -> Result<(Vec<String>, u64)> {
        let file_set = staging::local_file_set(paths)?;
        let assignments = RoleSearch::plan(&file_set)
            .map(|assignment| assignment.describe())
            .collect();

        Ok((assignments, RoleSearch::total_trials(&file_set)))
    }

    fn role_search(&self) -> RoleSearch {
        RoleSearch::new(self.invoker.clone())
            .with_stop_on_missing_tool(self.config.search.stop_on_missing_tool)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &HiveProbeError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
