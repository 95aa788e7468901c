use crate::csv::export_to_csv;
use crate::error::{ExportError, ExportResult};
use crate::format::{format_data_for_export, ExportConfig, Record};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json",
        }
    }

    /// 基础文件名加上扩展名
    pub fn file_name(&self, base: &str) -> String {
        format!("{}.{}", base, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 导出器：可选的字段配置 + 输出格式
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: Option<ExportConfig>,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExportConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// 有配置时先格式化，再按格式序列化
    ///
    /// 空数据返回 `ExportError::NoData`；JSON 使用两个空格缩进。
    pub fn render(&self, data: &[Record], format: ExportFormat) -> ExportResult<String> {
        if data.is_empty() {
            tracing::warn!(%format, "No data to export");
            return Err(ExportError::NoData);
        }

        let formatted;
        let records = match &self.config {
            Some(config) => {
                config.validate()?;
                formatted = format_data_for_export(data, config);
                formatted.as_slice()
            }
            None => data,
        };

        let output = match format {
            ExportFormat::Csv => export_to_csv(records)?,
            ExportFormat::Json => serde_json::to_string_pretty(records)?,
        };

        tracing::info!(%format, records = records.len(), bytes = output.len(), "Export rendered");
        Ok(output)
    }

    /// 渲染并写入文件，返回写入的路径
    pub fn export_to_file(
        &self,
        data: &[Record],
        format: ExportFormat,
        path: impl AsRef<Path>,
    ) -> ExportResult<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let output = self.render(data, format)?;
        fs::write(&path, output).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Export written");
        Ok(path)
    }
}
