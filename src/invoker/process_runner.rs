use std::fmt;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exit code reported when the tool never produced one of its own.
pub const SENTINEL_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A fully resolved command line for one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Why an invocation produced no real exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationFailure {
    Timeout,
    ToolNotFound,
    Spawn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub failure: Option<InvocationFailure>,
}

impl TrialResult {
    pub fn completed(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            failure: None,
        }
    }

    pub fn timed_out(timeout: Duration) -> Self {
        Self::failed(
            InvocationFailure::Timeout,
            format!("Timeout: command took longer than {}s", timeout.as_secs()),
        )
    }

    pub fn tool_not_found(program: &str) -> Self {
        Self::failed(
            InvocationFailure::ToolNotFound,
            format!("{} not found", program),
        )
    }

    pub fn spawn_error<S: Into<String>>(message: S) -> Self {
        Self::failed(InvocationFailure::Spawn, message.into())
    }

    fn failed(kind: InvocationFailure, message: String) -> Self {
        Self {
            exit_code: SENTINEL_EXIT_CODE,
            stdout: String::new(),
            stderr: message,
            failure: Some(kind),
        }
    }

    pub fn is_tool_missing(&self) -> bool {
        self.failure == Some(InvocationFailure::ToolNotFound)
    }
}

/// Runs a command to completion under a wall-clock budget.
pub trait ToolRunner: Send + Sync {
    fn run(&self, command: &ToolCommand, timeout: Duration) -> TrialResult;
}

/// Runs the real executable as a child process.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand, timeout: Duration) -> TrialResult {
        debug!(command = %command, timeout_secs = timeout.as_secs(), "spawning extraction tool");

        let mut child = match Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(program = %command.program, "extraction tool not found");
                return TrialResult::tool_not_found(&command.program);
            }
            Err(e) => return TrialResult::spawn_error(e.to_string()),
        };

        let deadline = Instant::now() + timeout;

        // Drain both pipes concurrently so a chatty tool cannot block on a full buffer.
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        match wait_until(&mut child, deadline) {
            Ok(Some(status)) => {
                // A background helper can keep the pipes open after the tool exits.
                let stdout = collect_output(stdout_reader, deadline);
                let stderr = collect_output(stderr_reader, deadline);
                let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
                    warn!(command = %command, "extraction tool output still open at the deadline");
                    return TrialResult::timed_out(timeout);
                };
                let exit_code = status.code().unwrap_or(SENTINEL_EXIT_CODE);
                debug!(exit_code, "extraction tool finished");
                TrialResult::completed(exit_code, stdout, stderr)
            }
            Ok(None) => {
                warn!(command = %command, "extraction tool timed out; killing it");
                let _ = child.kill();
                let _ = child.wait();
                // Reader threads may stay blocked on pipes held by grandchildren; they are left detached.
                TrialResult::timed_out(timeout)
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                TrialResult::spawn_error(e.to_string())
            }
        }
    }
}

fn wait_until(
    child: &mut Child,
    deadline: Instant,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            let _ = tx.send(String::from_utf8_lossy(&buffer).into_owned());
        });
        rx
    })
}

/// Waits for a drained pipe until `deadline`. `None` means it was still open.
fn collect_output(reader: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };

    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(program: &str, args: &[&str]) -> ToolCommand {
        ToolCommand {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_executable_is_reported() {
        let runner = ProcessRunner::new();
        let result = runner.run(
            &command("hiveprobe-no-such-tool-xyz", &[]),
            Duration::from_secs(5),
        );

        assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
        assert!(result.is_tool_missing());
        assert_eq!(result.stderr, "hiveprobe-no-such-tool-xyz not found");
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_and_exit_code() {
        let runner = ProcessRunner::new();
        let result = runner.run(
            &command("sh", &["-c", "echo out; echo err >&2; exit 3"]),
            Duration::from_secs(10),
        );

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
        assert!(result.failure.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let runner = ProcessRunner::new();
        let started = Instant::now();
        let result = runner.run(&command("sleep", &["30"]), Duration::from_secs(1));

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
        assert_eq!(result.failure, Some(InvocationFailure::Timeout));
        assert!(result.stderr.starts_with("Timeout"));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_helper_cannot_outlive_timeout() {
        let runner = ProcessRunner::new();
        let started = Instant::now();
        let result = runner.run(
            &command("sh", &["-c", "echo NT; sleep 8 &"]),
            Duration::from_secs(1),
        );

        assert!(
            started.elapsed() < Duration::from_secs(4),
            "run took {:?} with a 1s timeout",
            started.elapsed()
        );
        assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
        assert_eq!(result.failure, Some(InvocationFailure::Timeout));
        assert!(result.stdout.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_a_spawn_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let tool = dir.path().join("secretsdump.py");
        std::fs::write(&tool, "#!/bin/sh\necho NT\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();

        let runner = ProcessRunner::new();
        let result = runner.run(
            &command(&tool.to_string_lossy(), &[]),
            Duration::from_secs(5),
        );

        assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
        assert_eq!(result.failure, Some(InvocationFailure::Spawn));
        assert!(!result.is_tool_missing());
        assert!(result.stderr.contains("os error"), "stderr was {:?}", result.stderr);
    }

    #[test]
    fn test_command_display() {
        let cmd = command("secretsdump.py", &["-sam", "/tmp/a", "LOCAL"]);
        assert_eq!(cmd.to_string(), "secretsdump.py -sam /tmp/a LOCAL");
    }
}
