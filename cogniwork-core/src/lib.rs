// cogniwork-core: Cogniwork 的基础设施
//
// 提供：
// - 日志初始化（tracing-subscriber）
// - 分层配置（TOML 文件 + 环境变量）
// - 键盘快捷键注册与匹配
// - 动态字段值的宽松语义（校验与导出共用）

pub mod config;
pub mod error;
pub mod logging;
pub mod settings;
pub mod shortcut;
pub mod value;

pub use config::{ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource, TomlPropertySource};
pub use error::{CoreError, CoreResult, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use settings::{ExportSettings, Settings};
pub use shortcut::{Chord, KeyPress, Shortcut, ShortcutAction, ShortcutRegistry};

/// Prelude 模块，包含常用的类型
pub mod prelude {
    pub use crate::config::{ConfigValue, Environment, PropertySource};
    pub use crate::error::{CoreError, Result};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::settings::Settings;
    pub use anyhow::{anyhow, Context};
}
