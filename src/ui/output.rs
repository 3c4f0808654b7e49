use crate::error::{HiveProbeError, UserFriendlyError};
use crate::report::ProbeReport;
use crate::search::Outcome;
use crate::ui::progress::format_duration;
use console::{style, Emoji};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static KEY: Emoji = Emoji("🔑 ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => console::Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                // JSON mode prints only the final report so stdout stays one document.
                OutputMode::Json => {}
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &HiveProbeError) {
        let user_message = error.user_message();

        if self.mode == OutputMode::Json {
            self.print_json_object(&serde_json::json!({
                "success": false,
                "error": user_message,
                "suggestion": error.suggestion(),
            }));
            return;
        }

        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            if self.mode == OutputMode::Human {
                eprintln!();
                if self.use_colors {
                    eprintln!(
                        "{}{}",
                        INFO,
                        style(&format!("Suggestion: {}", suggestion)).cyan()
                    );
                } else {
                    eprintln!("Suggestion: {}", suggestion);
                }
            } else {
                eprintln!("SUGGESTION: {}", suggestion);
            }
        }
    }

    pub fn print_probe_report(&self, report: &ProbeReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    /// Lists the role assignments a probe would try.
    pub fn print_plan(&self, assignments: &[String], total_trials: u64) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "total_trials": total_trials,
                    "assignments": assignments,
                }));
            }
            _ => {
                self.print_header("Planned trials (SAM -> SYSTEM -> SECURITY)");
                for (index, assignment) in assignments.iter().enumerate() {
                    println!("  {:>4}. {}", index + 1, assignment);
                }
                println!();
                println!("  Total trials: {}", total_trials);
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{}{}", KEY, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Plain => println!("=== {} ===", title),
            OutputMode::Json => {}
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => println!("{}", "-".repeat(60)),
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (CHECKMARK, style(message).green().bold()),
                MessageType::Error => (CROSS, style(message).red().bold()),
                MessageType::Info => (INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        let line = serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        // Progress chatter goes to stderr so stdout holds only the report.
        eprintln!(
            "{}",
            serde_json::to_string(&line).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &ProbeReport) {
        self.print_header("Probe Report");

        println!("Files: {}", report.files.join(", "));
        println!("Trials run: {}", report.result.attempts.len());
        println!("Time taken: {}", format_duration(report.duration()));
        println!();

        if self.verbose_level >= 1 || !report.result.success {
            println!("Attempts:");
            for record in &report.result.attempts {
                let line = record.to_string();
                match (&record.outcome, self.use_colors) {
                    (Outcome::Success, true) => println!("  {}", style(line).green()),
                    (Outcome::Fail(_), true) => println!("  {}", style(line).dim()),
                    _ => println!("  {}", line),
                }
            }
            println!();
        }

        self.print_separator();

        match (&report.result.output, report.result.winning_attempt()) {
            (Some(output), Some(winner)) => {
                self.success(&format!(
                    "Roles found: {}",
                    winner.assignment
                ));
                if !report.accounts.is_empty() {
                    println!(
                        "  Accounts recovered: {} ({} with LM hashes)",
                        report.accounts.len(),
                        report.lm_hash_accounts()
                    );
                }
                println!();
                println!("{}", output.trim_end());
            }
            _ => {
                let message = report.result.error.as_deref().unwrap_or("Search failed");
                self.error(message);
            }
        }
    }

    fn print_plain_report(&self, report: &ProbeReport) {
        println!("REPORT: Role search completed");
        println!("Files: {}", report.files.join(", "));
        for record in &report.result.attempts {
            println!("{}", record);
        }
        println!("Success: {}", report.result.success);
        if let Some(ref output) = report.result.output {
            println!("Accounts: {}", report.accounts.len());
            println!("LM hashes: {}", report.lm_hash_accounts());
            println!("{}", output.trim_end());
        }
        if let Some(ref error) = report.result.error {
            println!("Error: {}", error);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode(), OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(!formatter.should_show_message(0));
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));
    }
}
