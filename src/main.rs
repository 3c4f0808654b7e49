use anyhow::Context;
use clap::Parser;
use hiveprobe::{
    Cli, HiveProbe, HiveProbeError, OutputFormatter, OutputMode, ToolInvoker, UserFriendlyError,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_BAD_INPUT: i32 = 2;
const EXIT_EXHAUSTED: i32 = 3;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Serving logs every request, so it defaults to info.
    let level = if cli.serve {
        cli.verbosity_level().max(1)
    } else {
        cli.verbosity_level()
    };
    setup_logging(level, cli.quiet);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    if cli.serve {
        return match handle_serve(&cli) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_FAILURE
            }
        };
    }

    let hiveprobe = match HiveProbe::from_cli(&cli) {
        Ok(hiveprobe) => hiveprobe,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let files = match cli.collect_input_files() {
        Ok(files) => files,
        Err(e) => {
            hiveprobe.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&hiveprobe, &files);
    }

    match hiveprobe.probe_files(&files) {
        Ok(report) => {
            hiveprobe.output_formatter().print_probe_report(&report);
            if report.is_success() {
                EXIT_SUCCESS
            } else {
                EXIT_EXHAUSTED
            }
        }
        Err(e) => {
            hiveprobe.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &HiveProbeError) -> i32 {
    if error.is_client_error() {
        EXIT_BAD_INPUT
    } else {
        EXIT_FAILURE
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("hiveprobe.toml"));

    match HiveProbe::generate_sample_config(&config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!(
                "  hiveprobe <files>... --config {}",
                config_path.display()
            );
            println!("\nEdit the file to point at your extraction tool and adjust timeouts.");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            EXIT_FAILURE
        }
    }
}

fn handle_dry_run(hiveprobe: &HiveProbe, files: &[PathBuf]) -> i32 {
    let formatter = hiveprobe.output_formatter();

    formatter.info("DRY RUN MODE - the extraction tool will not be run");

    let (assignments, total_trials) = match hiveprobe.plan(files) {
        Ok(plan) => plan,
        Err(e) => {
            hiveprobe.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if formatter.mode() != OutputMode::Json {
        let config = hiveprobe.config();
        formatter.info("Configuration that would be used:");
        println!("  Tool: {}", config.tool.executable);
        println!("  Timeout per trial: {} seconds", config.tool.timeout);
        println!("  Target: {}", config.tool.target);
        println!(
            "  Stop on missing tool: {}",
            config.search.stop_on_missing_tool
        );
        formatter.print_separator();
    }

    formatter.print_plan(&assignments, total_trials);
    EXIT_SUCCESS
}

fn handle_serve(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config().context("failed to load configuration")?;
    let invoker = ToolInvoker::new(config.tool.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime
        .block_on(hiveprobe::server::serve(config, invoker))
        .context("upload server failed")?;

    Ok(())
}

fn print_startup_error(error: &HiveProbeError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbosity: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hiveprobe={},tower_http={}", default_level, default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiveprobe::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["hiveprobe", "--generate-config", "--config", &config_arg])
            .unwrap();

        assert_eq!(handle_generate_config(&cli), EXIT_SUCCESS);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[tool]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"1").unwrap();
        fs::write(&b, b"2").unwrap();

        let hiveprobe = HiveProbe::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&hiveprobe, &[a, b]), EXIT_SUCCESS);
    }

    #[test]
    fn test_dry_run_with_one_file_is_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        fs::write(&a, b"1").unwrap();

        let hiveprobe = HiveProbe::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&hiveprobe, &[a]), EXIT_BAD_INPUT);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&HiveProbeError::malformed("No files uploaded")),
            EXIT_BAD_INPUT
        );
        assert_eq!(
            exit_code_for(&HiveProbeError::Config {
                message: "bad".to_string()
            }),
            EXIT_FAILURE
        );
    }
}
