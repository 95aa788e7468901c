//! 导出前的记录格式化
//!
//! 逐条记录、逐个记录自身的键处理：重命名为显示标签、格式化日期和数字、剔除排除字段。
//! 配置中声明但记录里没有的字段会被直接跳过，不会补出空值。

use crate::error::{ExportError, ExportResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 一条导出记录，键保持原始顺序
pub type Record = Map<String, Value>;

pub const DEFAULT_DECIMALS: u32 = 2;

/// 定点格式化允许的最大小数位数
pub const MAX_DECIMALS: u32 = 100;

pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// 字段值的格式化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Date,
    Number,
}

/// 单个字段的导出配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,

    #[serde(default)]
    pub exclude: bool,
}

impl FieldFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn date(mut self) -> Self {
        self.kind = Some(FieldKind::Date);
        self
    }

    pub fn number(mut self, decimals: u32) -> Self {
        self.kind = Some(FieldKind::Number);
        self.decimals = Some(decimals);
        self
    }

    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// 实际使用的小数位数；未设置或为 0 时取默认的 2 位
    pub fn effective_decimals(&self) -> u32 {
        self.decimals.filter(|d| *d != 0).unwrap_or(DEFAULT_DECIMALS)
    }

    /// 输出键：非空标签优先，否则使用原字段名
    fn output_key<'a>(&'a self, key: &'a str) -> &'a str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => key,
        }
    }

    fn validate(&self, field: &str) -> ExportResult<()> {
        if let Some(decimals) = self.decimals {
            if self.kind != Some(FieldKind::Number) {
                return Err(ExportError::InvalidConfig {
                    field: field.to_string(),
                    message: "decimals requires type = \"number\"".to_string(),
                });
            }
            if decimals > MAX_DECIMALS {
                return Err(ExportError::InvalidConfig {
                    field: field.to_string(),
                    message: format!("decimals must be at most {}, got {}", MAX_DECIMALS, decimals),
                });
            }
        }
        Ok(())
    }
}

/// 导出配置：源字段名 -> 字段配置
///
/// ```toml
/// [hire_date]
/// label = "Hire Date"
/// type = "date"
///
/// [salary]
/// type = "number"
/// decimals = 1
///
/// [ssn]
/// exclude = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportConfig {
    fields: BTreeMap<String, FieldFormat>,
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, format: FieldFormat) -> Self {
        self.fields.insert(name.into(), format);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldFormat> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_toml_str(content: &str) -> ExportResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> ExportResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ExportResult<()> {
        self.fields
            .iter()
            .try_for_each(|(name, format)| format.validate(name))
    }
}

/// 按配置格式化记录，输出顺序与输入一致
pub fn format_data_for_export(data: &[Record], config: &ExportConfig) -> Vec<Record> {
    tracing::debug!(records = data.len(), configured_fields = config.fields.len(), "Formatting records for export");
    data.iter().map(|record| format_record(record, config)).collect()
}

fn format_record(record: &Record, config: &ExportConfig) -> Record {
    let mut formatted = Record::new();

    for (key, value) in record {
        let Some(format) = config.get(key) else {
            formatted.insert(key.clone(), value.clone());
            continue;
        };

        if format.exclude {
            continue;
        }

        let value = match format.kind {
            Some(FieldKind::Date) if cogniwork_core::value::is_present(value) => {
                Value::String(format_date(value))
            }
            Some(FieldKind::Number) => match value.as_f64() {
                Some(number) => Value::String(format_fixed(number, format.effective_decimals())),
                None => value.clone(),
            },
            _ => value.clone(),
        };

        formatted.insert(format.output_key(key).to_string(), value);
    }

    formatted
}

/// 定点小数
///
/// 恰好落在中点的值远离零舍入（4.25 -> "4.3"，-2.5 -> "-3"），负数即使舍入为零也保留符号。
pub fn format_fixed(number: f64, decimals: u32) -> String {
    let precision = decimals as usize;
    let magnitude = number.abs();

    let digits = if is_exact_tie(magnitude, precision) {
        round_tie_away_from_zero(magnitude, precision)
    } else {
        format!("{:.*}", precision, magnitude)
    };

    if number < 0.0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// 第 precision + 1 位小数是 5 且其后全为 0
fn is_exact_tie(magnitude: f64, precision: usize) -> bool {
    // 残差的首个非零位不会超过这个范围
    let expanded = format!("{:.*}", precision + 25, magnitude);
    match expanded.split_once('.') {
        Some((_, fraction)) => {
            let tail = &fraction[precision..];
            tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0')
        }
        None => false,
    }
}

fn round_tie_away_from_zero(magnitude: f64, precision: usize) -> String {
    let exact = format!("{:.*}", precision + 1, magnitude);
    let mut digits: Vec<u8> = exact.as_bytes()[..exact.len() - 1].to_vec();
    if digits.last() == Some(&b'.') {
        digits.pop();
    }

    let mut index = digits.len();
    loop {
        if index == 0 {
            digits.insert(0, b'1');
            break;
        }
        index -= 1;
        match digits[index] {
            b'.' => continue,
            b'9' => digits[index] = b'0',
            digit => {
                digits[index] = digit + 1;
                break;
            }
        }
    }

    digits.into_iter().map(char::from).collect()
}

/// 日期显示为 `月/日/年`，无法解析时返回 "Invalid Date"
///
/// 支持 ISO-8601 日期、带或不带时区的日期时间，以及毫秒时间戳。
pub fn format_date(value: &Value) -> String {
    parse_date(value)
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
        }
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}
