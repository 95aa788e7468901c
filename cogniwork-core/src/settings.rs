use crate::config::{Environment, EnvironmentPropertySource, TomlPropertySource};
use crate::error::CoreResult;
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "COGNIWORK_";

/// 默认导出文件名（不含扩展名）
pub const DEFAULT_EXPORT_FILENAME: &str = "export";

/// 导出相关设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// "csv" 或 "json"，由导出模块解析
    pub format: String,
    pub filename: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: "csv".to_string(),
            filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

/// 应用设置
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub export: ExportSettings,
}

impl Settings {
    /// 从 Environment 绑定设置，缺失的键使用默认值
    pub fn from_environment(env: &Environment) -> CoreResult<Self> {
        let mut logging = LoggingConfig::default();
        if let Some(level) = env.get_parsed::<LogLevel>("logging.level")? {
            logging.level = level;
        }
        if let Some(format) = env.get_parsed::<LogFormat>("logging.format")? {
            logging.format = format;
        }
        logging.show_target = env.get_bool_or("logging.show-target", false);
        logging.filter = env.get_string("logging.filter");

        let defaults = ExportSettings::default();
        let export = ExportSettings {
            format: env.get_string_or("export.format", &defaults.format),
            filename: env.get_string_or("export.filename", &defaults.filename),
        };

        Ok(Self { logging, export })
    }

    /// 标准加载顺序：可选的 TOML 文件 < `COGNIWORK_` 环境变量 < `LOG_LEVEL` / `LOG_FORMAT` / `RUST_LOG`
    pub fn load(config_file: Option<&Path>) -> CoreResult<Self> {
        Self::load_with(config_file, |name| std::env::var(name).ok())
    }

    /// 同 [`Settings::load`]，日志变量从 `vars` 读取
    pub fn load_with<F>(config_file: Option<&Path>, vars: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = Environment::new();
        if let Some(path) = config_file {
            env.add_property_source(Box::new(TomlPropertySource::from_file(path)?));
        }
        env.add_property_source(Box::new(EnvironmentPropertySource::new(ENV_PREFIX)));

        let mut settings = Self::from_environment(&env)?;
        settings.logging = settings.logging.overlay(vars);
        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}
