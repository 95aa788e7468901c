//! 动态字段值的宽松语义
//!
//! 表单值和导出记录都是 `serde_json::Value`。这里集中定义
//! "是否有值"、数值转换和字符串化的规则，校验与导出共用同一套行为。

use serde_json::Value;

/// 值是否"存在"：null、false、0、空字符串视为不存在
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 转换为有限数值，无法转换时返回 None
///
/// 字符串两端空白会被忽略，空字符串视为 0。
pub fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

/// 字符串值的字符数，数组的元素个数；其他类型没有长度
pub fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// 数值的显示形式：整数值不带小数部分（3.0 -> "3"）
pub fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e21 {
        format!("{}", number as i128)
    } else {
        number.to_string()
    }
}

const OBJECT_TEXT: &str = "[object Object]";

/// 字符串化，用于正则匹配和 CSV 单元格
///
/// 数组按元素逐个字符串化后以逗号连接，null 元素为空串；对象输出为 `[object Object]`。
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => OBJECT_TEXT.to_string(),
    }
}
