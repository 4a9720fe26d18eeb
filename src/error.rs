use thiserror::Error;

/// Unified error type for gem-prepare operations
#[derive(Error, Debug)]
pub enum GemPrepareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid version pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Verification failed: {0}")]
    Verify(String),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed with {}", describe_exit(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Process error: {0}")]
    Process(String),
}

/// Convenience type alias for Results in gem-prepare
pub type Result<T> = std::result::Result<T, GemPrepareError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl GemPrepareError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GemPrepareError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GemPrepareError::Version(msg.into())
    }

    /// Create a verification error with context
    pub fn verify(msg: impl Into<String>) -> Self {
        GemPrepareError::Verify(msg.into())
    }

    /// Create a process error with context
    pub fn process(msg: impl Into<String>) -> Self {
        GemPrepareError::Process(msg.into())
    }
}
