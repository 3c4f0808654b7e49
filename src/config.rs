use crate::error::{HiveProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub staging: StagingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub executable: String,
    pub timeout: u64,
    pub sam_flag: String,
    pub system_flag: String,
    pub security_flag: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Stop after the first trial that could not locate the extraction tool.
    pub stop_on_missing_tool: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingConfig {
    pub base_directory: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: "secretsdump.py".to_string(),
            timeout: 60,
            sam_flag: "-sam".to_string(),
            system_flag: "-system".to_string(),
            security_flag: "-security".to_string(),
            target: "LOCAL".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            max_upload_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HiveProbeError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HiveProbeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HiveProbeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = [
                    "hiveprobe.toml",
                    "hiveprobe.config.toml",
                    ".hiveprobe.toml",
                ];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref executable) = cli_args.tool {
            self.tool.executable = executable.clone();
        }

        if let Some(timeout) = cli_args.timeout {
            self.tool.timeout = timeout;
        }

        if let Some(stop) = cli_args.stop_on_missing_tool {
            self.search.stop_on_missing_tool = stop;
        }

        if let Some(ref listen) = cli_args.listen {
            self.server.listen = listen.clone();
        }

        if let Some(ref staging_dir) = cli_args.staging_dir {
            self.staging.base_directory = Some(staging_dir.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| HiveProbeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| HiveProbeError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool.executable.trim().is_empty() {
            return Err(HiveProbeError::Config {
                message: "The extraction tool executable must be specified".to_string(),
            });
        }

        if self.tool.timeout == 0 {
            return Err(HiveProbeError::Config {
                message: "Tool timeout must be greater than 0".to_string(),
            });
        }

        if self.server.max_upload_bytes == 0 {
            return Err(HiveProbeError::Config {
                message: "Maximum upload size must be greater than 0".to_string(),
            });
        }

        if self.server.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(HiveProbeError::Config {
                message: format!("Invalid listen address: {}", self.server.listen),
            });
        }

        if let Some(ref base) = self.staging.base_directory {
            if !base.is_dir() {
                return Err(HiveProbeError::Config {
                    message: format!("Staging directory does not exist: {}", base.display()),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub tool: Option<String>,
    pub timeout: Option<u64>,
    pub stop_on_missing_tool: Option<bool>,
    pub listen: Option<String>,
    pub staging_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Option<String>) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stop_on_missing_tool(mut self, stop: Option<bool>) -> Self {
        self.stop_on_missing_tool = stop;
        self
    }

    pub fn with_listen(mut self, listen: Option<String>) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_staging_dir(mut self, staging_dir: Option<PathBuf>) -> Self {
        self.staging_dir = staging_dir;
        self
    }
}
