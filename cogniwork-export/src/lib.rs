//! Cogniwork Export - 记录格式化与导出
//!
//! 导出流程：`format_data_for_export` 按 `ExportConfig` 重命名、格式化并剔除字段，
//! 然后序列化为 CSV 或 JSON。写文件之外的下载行为不在本 crate 范围内。

pub mod csv;
pub mod error;
pub mod exporter;
pub mod format;

pub use csv::{escape_cell, export_to_csv, table_to_csv};
pub use error::{ExportError, ExportResult};
pub use exporter::{ExportFormat, Exporter};
pub use format::{format_data_for_export, ExportConfig, FieldFormat, FieldKind, Record};
