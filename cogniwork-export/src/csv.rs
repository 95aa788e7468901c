use crate::error::{ExportError, ExportResult};
use crate::format::Record;
use cogniwork_core::value::to_text;
use serde_json::Value;

const DELIMITER: &str = ",";
const LINE_SEPARATOR: &str = "\n";

/// 包含逗号或双引号的单元格用双引号包裹，内部双引号加倍
pub fn escape_cell(cell: &str) -> String {
    if cell.contains(DELIMITER) || cell.contains('"') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// 缺失和 null 输出为空，其余值按默认字符串化后转义
///
/// 数字和布尔值不会含有分隔符，因此输出不带引号；数组连接后的逗号会被引号包裹。
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape_cell(s),
        Some(other) => escape_cell(&to_text(other)),
    }
}

/// 序列化为 CSV
///
/// 表头取第一条记录的键（假设所有记录结构一致），其余记录按表头顺序取值。
pub fn export_to_csv(data: &[Record]) -> ExportResult<String> {
    let Some(first) = data.first() else {
        tracing::warn!("No data to export");
        return Err(ExportError::NoData);
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut lines = Vec::with_capacity(data.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| h.as_str())
            .collect::<Vec<_>>()
            .join(DELIMITER),
    );

    for row in data {
        let cells: Vec<String> = headers.iter().map(|h| render_cell(row.get(*h))).collect();
        lines.push(cells.join(DELIMITER));
    }

    tracing::debug!(rows = data.len(), columns = headers.len(), "CSV rendered");
    Ok(lines.join(LINE_SEPARATOR))
}

/// 把已渲染表格的单元格文本转换为 CSV，表头行与数据行一视同仁
///
/// 每个单元格先去除首尾空白再转义。
pub fn table_to_csv<R, C>(rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    rows.iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|cell| escape_cell(cell.as_ref().trim()))
                .collect::<Vec<_>>()
                .join(DELIMITER)
        })
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}
