use anyhow::{bail, Context, Result};
use cogniwork_core::{Chord, ExportSettings, ShortcutRegistry};
use cogniwork_export::{ExportConfig, ExportFormat, Exporter, Record};
use cogniwork_validator::{validate_form, FormValidation, FormValues, SchemaSpec};
use std::fs;
use std::path::{Path, PathBuf};

/// 写到标准输出的特殊路径
pub const STDOUT_PATH: &str = "-";

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// 校验表单值文件
pub fn validate(values_path: &Path, schema_path: &Path) -> Result<FormValidation> {
    let values: FormValues = serde_json::from_str(&read_file(values_path)?)
        .with_context(|| format!("{} must contain a JSON object", values_path.display()))?;

    let content = read_file(schema_path)?;
    let spec = if is_toml(schema_path) {
        SchemaSpec::from_toml_str(&content)
    } else {
        SchemaSpec::from_json_str(&content)
    }
    .with_context(|| format!("Invalid schema in {}", schema_path.display()))?;

    let schema = spec.build(&values)?;
    let validation = validate_form(&values, &schema);
    tracing::info!(valid = validation.is_valid, errors = validation.errors.len(), "Validation finished");
    Ok(validation)
}

/// 导出参数
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub output: Option<PathBuf>,
}

/// 导出结果的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Stdout(String),
    File(PathBuf),
}

pub fn load_export_config(path: &Path) -> Result<ExportConfig> {
    let content = read_file(path)?;
    let config = if is_toml(path) {
        ExportConfig::from_toml_str(&content)
    } else {
        ExportConfig::from_json_str(&content)
    };
    config.with_context(|| format!("Invalid export config in {}", path.display()))
}

pub fn export(request: &ExportRequest, settings: &ExportSettings) -> Result<ExportTarget> {
    let data: Vec<Record> = serde_json::from_str(&read_file(&request.input)?)
        .with_context(|| format!("{} must contain a JSON array of objects", request.input.display()))?;

    let format = match request.format {
        Some(format) => format,
        None => settings
            .format
            .parse::<ExportFormat>()
            .context("Invalid export.format setting")?,
    };

    let exporter = match &request.config {
        Some(path) => Exporter::with_config(load_export_config(path)?),
        None => Exporter::new(),
    };

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format.file_name(&settings.filename)));

    if output.as_os_str() == STDOUT_PATH {
        return Ok(ExportTarget::Stdout(exporter.render(&data, format)?));
    }

    let written = exporter.export_to_file(&data, format, &output)?;
    Ok(ExportTarget::File(written))
}

/// 列出快捷键；给定组合键时只列出会被触发的快捷键
pub fn shortcuts(press: Option<&str>) -> Result<Vec<String>> {
    let registry = ShortcutRegistry::defaults();

    let matched: Vec<_> = match press {
        Some(raw) => {
            let chord: Chord = raw.parse()?;
            let triggered = registry.dispatch(&chord.to_key_press());
            if triggered.is_empty() {
                bail!("No shortcut bound to {}", chord);
            }
            triggered
        }
        None => registry.shortcuts().iter().collect(),
    };

    Ok(matched
        .into_iter()
        .map(|s| format!("{:<12} {}", s.chord.to_string(), s.description))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_validate_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let values = write_temp(&dir, "values.json", r#"{"email": "nope", "password": "Abc12345", "confirm": "Abc12345"}"#);
        let schema = write_temp(
            &dir,
            "schema.toml",
            r#"
email = [{ rule = "required" }, { rule = "email" }]
password = [{ rule = "password" }]
confirm = [{ rule = "match_field", field = "password" }]
"#,
        );

        let result = validate(&values, &schema).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors["email"], "Please enter a valid email address");
    }

    #[test]
    fn test_validate_rejects_non_object_values() {
        let dir = tempfile::tempdir().unwrap();
        let values = write_temp(&dir, "values.json", "[1, 2]");
        let schema = write_temp(&dir, "schema.json", "{}");
        assert!(validate(&values, &schema).is_err());
    }

    #[test]
    fn test_export_to_stdout_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_temp(&dir, "team.json", r#"[{"name": "Ada", "rating": 4.25, "ssn": "1"}]"#);
        let config = write_temp(&dir, "export.toml", "[rating]\ntype = \"number\"\ndecimals = 1\n\n[ssn]\nexclude = true\n");

        let mut request = ExportRequest {
            input,
            config: Some(config),
            format: None,
            output: Some(PathBuf::from(STDOUT_PATH)),
        };
        let target = export(&request, &ExportSettings::default()).unwrap();
        assert_eq!(target, ExportTarget::Stdout("name,rating\nAda,4.3".to_string()));

        let out = dir.path().join("team.json.out");
        request.format = Some(ExportFormat::Json);
        request.output = Some(out.clone());
        assert_eq!(export(&request, &ExportSettings::default()).unwrap(), ExportTarget::File(out.clone()));
        assert!(fs::read_to_string(&out).unwrap().contains("\"rating\": \"4.3\""));
    }

    #[test]
    fn test_shortcuts_listing() {
        assert_eq!(shortcuts(None).unwrap().len(), 4);
        let triggered = shortcuts(Some("cmd+k")).unwrap();
        assert_eq!(triggered.len(), 1);
        assert!(triggered[0].ends_with("Open search"));
        assert!(shortcuts(Some("ctrl+z")).is_err());
    }
}
