use std::path::PathBuf;
use thiserror::Error;

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("Invalid export config for field '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Unknown export format '{0}', expected 'csv' or 'json'")]
    UnknownFormat(String),

    #[error("Failed to parse TOML export config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;
