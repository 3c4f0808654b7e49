use crate::config::{CliOverrides, Config};
use crate::error::{HiveProbeError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "hiveprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Work out which registry hive export is SAM, SYSTEM and SECURITY")]
#[command(
    long_about = "HiveProbe takes registry hive exports whose roles are unknown, tries every \
                  SAM/SYSTEM/SECURITY assignment against an offline credential extraction tool \
                  (secretsdump.py by default) and reports the first assignment that yields hashes."
)]
#[command(before_help = "🔑 HiveProbe - Hive Role Discovery")]
#[command(after_help = "EXAMPLES:\n  \
    hiveprobe export1.hiv export2.hiv export3.hiv\n  \
    hiveprobe --dir ./Registry_Backup --output-format json\n  \
    hiveprobe a.hiv b.hiv --tool impacket-secretsdump --timeout 120\n  \
    hiveprobe --serve --listen 0.0.0.0:5000")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Hive export files of unknown role
    pub files: Vec<PathBuf>,

    /// Also probe every regular file directly inside this directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Extraction tool executable
    #[arg(short, long, env = "HIVEPROBE_TOOL", help = "Extraction tool executable (default: secretsdump.py)")]
    pub tool: Option<String>,

    /// Per-trial timeout in seconds
    #[arg(long, help = "Timeout for a single tool run (seconds)")]
    pub timeout: Option<u64>,

    /// Stop after the first trial reports the tool as missing
    #[arg(long)]
    pub stop_on_missing_tool: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directory that holds per-run staging directories
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show the planned role assignments without running the tool
    #[arg(long)]
    pub dry_run: bool,

    /// Serve the upload endpoint instead of probing local files
    #[arg(long, conflicts_with_all = ["files", "dir", "dry_run"])]
    pub serve: bool,

    /// Address for --serve to listen on
    #[arg(long, requires = "serve")]
    pub listen: Option<String>,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_tool(self.tool.clone())
            .with_timeout(self.timeout)
            .with_stop_on_missing_tool(self.stop_on_missing_tool.then_some(true))
            .with_listen(self.listen.clone())
            .with_staging_dir(self.staging_dir.clone())
    }

    /// Positional files first, then the directory's files in name order.
    pub fn collect_input_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = self.files.clone();

        if let Some(ref dir) = self.dir {
            if !dir.is_dir() {
                return Err(HiveProbeError::InvalidInput {
                    path: dir.display().to_string(),
                });
            }

            for entry in WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| HiveProbeError::InvalidInput {
                    path: format!("{} ({})", dir.display(), e),
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        }

        Ok(files)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
