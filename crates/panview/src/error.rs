use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("invalid configuration: {}", errors.join("; "))]
    InvalidConfig { errors: Vec<String> },

    #[error("trace line {line}: {message}")]
    TraceParse { line: usize, message: String },

    #[error("no window with index {index}")]
    UnknownWindow { index: usize },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },
}

impl ShellError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } | Self::Toml(_) => 2,
            Self::TraceParse { .. } | Self::MissingPath { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn trace(line: usize, message: impl Into<String>) -> Self {
        Self::TraceParse {
            line,
            message: message.into(),
        }
    }
}
