use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures of the environment capabilities and configuration layer.
///
/// A scan itself never fails on a single entry; these errors only occur while
/// locating the library root, talking to an interpreter or loading settings.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Library root is not a directory: {0}")]
    RootMissing(PathBuf),

    #[error("Failed to run interpreter '{program}': {source}")]
    Interpreter {
        program: String,
        source: std::io::Error,
    },

    #[error("Interpreter '{program}' exited with {status}: {stderr}")]
    InterpreterFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Interpreter '{0}' produced output that is not valid UTF-8")]
    NotUtf8(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Refusing to overwrite existing configuration: {0}")]
    ConfigExists(PathBuf),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            source,
            path: path.into(),
        }
    }
}
