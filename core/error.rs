use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Configuration Parse Error: Path '{path}', Error: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid Pattern Error: Pattern '{pattern}', Error: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Project Root Error: {0}")]
    ProjectRoot(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode Error: Path '{path}' is not valid UTF-8 text")]
    Decode { path: PathBuf },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("TikToken Error: {0}")]
    TikToken(String),
}

impl AppError {
    /// Pattern compilation failures count as configuration errors.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::Config(_) | AppError::ConfigParse { .. } | AppError::InvalidPattern { .. }
        )
    }

    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            AppError::FileWrite { .. } | AppError::DirCreation { .. }
        )
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}
