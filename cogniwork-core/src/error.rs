use thiserror::Error;

/// 统一的应用层结果类型
///
/// 应用代码（CLI、配置加载）使用 anyhow::Result，通过 .context() 补充上下文。
///
/// # 示例
///
/// ```rust,ignore
/// use anyhow::{Context, Result};
///
/// fn load(path: &Path) -> Result<Settings> {
///     let source = TomlPropertySource::from_file(path)
///         .with_context(|| format!("Failed to load settings from {:?}", path))?;
///     ...
/// }
/// ```
pub use anyhow::Result;

/// 核心模块错误
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid shortcut chord '{0}'")]
    InvalidChord(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
