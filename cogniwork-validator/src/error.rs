use thiserror::Error;

/// 构建校验规则或表单 schema 时的错误
///
/// 字段校验失败本身不是错误，而是返回给调用方展示的消息。
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to parse TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON schema: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SchemaResult<T> = Result<T, SchemaError>;
