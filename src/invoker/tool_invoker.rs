use crate::config::ToolConfig;
use crate::invoker::{ProcessRunner, ToolCommand, ToolRunner, TrialResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Runs the extraction tool against one SAM/SYSTEM/SECURITY role assignment.
#[derive(Clone)]
pub struct ToolInvoker {
    runner: Arc<dyn ToolRunner>,
    tool: ToolConfig,
}

impl ToolInvoker {
    pub fn new(tool: ToolConfig) -> Self {
        Self::with_runner(tool, Arc::new(ProcessRunner::new()))
    }

    pub fn with_runner(tool: ToolConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner, tool }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.tool.timeout)
    }

    pub fn executable(&self) -> &str {
        &self.tool.executable
    }

    pub fn build_command(&self, sam: &Path, system: &Path, security: &Path) -> ToolCommand {
        ToolCommand {
            program: self.tool.executable.clone(),
            args: vec![
                self.tool.sam_flag.clone(),
                sam.to_string_lossy().into_owned(),
                self.tool.system_flag.clone(),
                system.to_string_lossy().into_owned(),
                self.tool.security_flag.clone(),
                security.to_string_lossy().into_owned(),
                self.tool.target.clone(),
            ],
        }
    }

    /// Never touches the candidate files; it only hands their paths to the tool.
    pub fn invoke(&self, sam: &Path, system: &Path, security: &Path) -> TrialResult {
        let command = self.build_command(sam, system, security);
        self.runner.run(&command, self.timeout())
    }
}

impl std::fmt::Debug for ToolInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolInvoker")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        seen: Mutex<Vec<(ToolCommand, Duration)>>,
    }

    impl ToolRunner for RecordingRunner {
        fn run(&self, command: &ToolCommand, timeout: Duration) -> TrialResult {
            self.seen.lock().unwrap().push((command.clone(), timeout));
            TrialResult::completed(0, String::new(), String::new())
        }
    }

    #[test]
    fn test_command_line_layout() {
        let invoker = ToolInvoker::new(ToolConfig::default());
        let command = invoker.build_command(
            Path::new("/s/sam"),
            Path::new("/s/system"),
            Path::new("/s/security"),
        );

        assert_eq!(command.program, "secretsdump.py");
        assert_eq!(
            command.args,
            vec![
                "-sam",
                "/s/sam",
                "-system",
                "/s/system",
                "-security",
                "/s/security",
                "LOCAL"
            ]
        );
    }

    #[test]
    fn test_invoke_passes_configured_timeout() {
        let runner = Arc::new(RecordingRunner::default());
        let mut tool = ToolConfig::default();
        tool.timeout = 7;
        tool.executable = "impacket-secretsdump".to_string();

        let invoker = ToolInvoker::with_runner(tool, runner.clone());
        invoker.invoke(Path::new("a"), Path::new("b"), Path::new("b"));

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.program, "impacket-secretsdump");
        assert_eq!(seen[0].1, Duration::from_secs(7));
    }
}
