use thiserror::Error;

#[derive(Error, Debug)]
pub enum HiveProbeError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Invalid input file: {path}")]
    InvalidInput { path: String },

    #[error("Server error: {message}")]
    Server { message: String },
}

impl HiveProbeError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        HiveProbeError::MalformedRequest {
            message: message.into(),
        }
    }

    /// True for errors caused by what the caller supplied rather than by the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HiveProbeError::MalformedRequest { .. } | HiveProbeError::InvalidInput { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for HiveProbeError {
    fn user_message(&self) -> String {
        match self {
            HiveProbeError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            HiveProbeError::MalformedRequest { message } => message.clone(),
            HiveProbeError::InvalidInput { path } => {
                format!("Not a readable regular file: {}", path)
            }
            HiveProbeError::Server { message } => {
                format!("Server error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            HiveProbeError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            HiveProbeError::MalformedRequest { .. } => Some(
                "Provide at least two hive candidates (e.g. the SAM and SYSTEM exports), each with a distinct file name.".to_string()
            ),
            HiveProbeError::InvalidInput { .. } => Some(
                "Make sure every path points to an existing regular file you can read.".to_string()
            ),
            HiveProbeError::Server { .. } => Some(
                "Check that the listen address is valid and not already in use (--listen).".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for HiveProbeError {
    fn from(error: toml::de::Error) -> Self {
        HiveProbeError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HiveProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = HiveProbeError::malformed("You must upload at least 2 files");
        assert_eq!(error.user_message(), "You must upload at least 2 files");
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(HiveProbeError::malformed("A file is empty").is_client_error());
        assert!(HiveProbeError::InvalidInput {
            path: "/nope".to_string()
        }
        .is_client_error());
        assert!(!HiveProbeError::Config {
            message: "bad".to_string()
        }
        .is_client_error());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error = HiveProbeError::from(toml_error);
        assert!(matches!(error, HiveProbeError::Config { .. }));
    }
}
