//! 声明式 schema
//!
//! 规则以数据形式描述，可从 TOML 或 JSON 加载：
//!
//! ```toml
//! email = [{ rule = "required" }, { rule = "email" }]
//! password = [{ rule = "password" }]
//! confirm = [{ rule = "match_field", field = "password" }]
//! ```

use crate::error::SchemaResult;
use crate::rules::{self, BoxedRule, RuleExt};
use crate::validator::{FormValues, Schema};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::Value;

/// 单条规则的声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    Required,
    Email,
    Password,
    Number,
    Url,
    Phone,
    MinLength {
        value: usize,
    },
    MaxLength {
        value: usize,
    },
    Min {
        value: f64,
    },
    Max {
        value: f64,
    },
    /// 与表单中另一个字段的当前值比较，`label` 用于错误消息
    MatchField {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Pattern {
        regex: String,
        message: String,
    },
}

impl RuleSpec {
    /// 构建规则；`match_field` 取 `values` 中被引用字段的当前值，缺失视为 null
    pub fn build(&self, values: &FormValues) -> SchemaResult<BoxedRule> {
        let rule = match self {
            RuleSpec::Required => rules::required().boxed(),
            RuleSpec::Email => rules::email().boxed(),
            RuleSpec::Password => rules::password().boxed(),
            RuleSpec::Number => rules::number().boxed(),
            RuleSpec::Url => rules::url().boxed(),
            RuleSpec::Phone => rules::phone().boxed(),
            RuleSpec::MinLength { value } => rules::min_length(*value).boxed(),
            RuleSpec::MaxLength { value } => rules::max_length(*value).boxed(),
            RuleSpec::Min { value } => rules::min(*value).boxed(),
            RuleSpec::Max { value } => rules::max(*value).boxed(),
            RuleSpec::MatchField { field, label } => {
                let other = values.get(field).cloned().unwrap_or(Value::Null);
                let name = label.as_deref().unwrap_or(field);
                rules::match_field(name, other).boxed()
            }
            RuleSpec::Pattern { regex, message } => rules::pattern(regex, message.as_str())?.boxed(),
        };
        Ok(rule)
    }
}

/// 字段 -> 规则声明列表，保持文件中的声明顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSpec {
    pub fields: IndexMap<String, Vec<RuleSpec>>,
}

impl SchemaSpec {
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 针对给定的表单值构建可执行的 schema
    pub fn build(&self, values: &FormValues) -> SchemaResult<Schema> {
        let mut schema = Schema::new();
        for (field, specs) in &self.fields {
            let rules = specs
                .iter()
                .map(|spec| spec.build(values))
                .collect::<SchemaResult<Vec<_>>>()?;
            schema.set_rules(field.clone(), rules);
        }
        tracing::debug!(fields = schema.len(), "Schema built from spec");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::rules::{PASSWORD_UPPERCASE_MESSAGE, REQUIRED_MESSAGE};
    use crate::validator::validate_form;
    use serde_json::json;

    const SIGNUP: &str = r#"
email = [{ rule = "required" }, { rule = "email" }]
password = [{ rule = "password" }]
confirm = [{ rule = "match_field", field = "password", label = "Password" }]
age = [{ rule = "number" }, { rule = "min", value = 18 }, { rule = "max", value = 70.5 }]
bio = [{ rule = "max_length", value = 20 }]
employee_id = [{ rule = "pattern", regex = '^EMP-\d+$', message = "Invalid employee ID" }]
"#;

    fn values(value: Value) -> FormValues {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_parse_toml_schema() {
        let spec = SchemaSpec::from_toml_str(SIGNUP).unwrap();
        assert_eq!(spec.fields.len(), 6);
        assert_eq!(spec.fields["email"], vec![RuleSpec::Required, RuleSpec::Email]);
        assert_eq!(spec.fields["age"][1], RuleSpec::Min { value: 18.0 });
        assert_eq!(
            spec.fields["confirm"][0],
            RuleSpec::MatchField {
                field: "password".into(),
                label: Some("Password".into())
            }
        );
    }

    #[test]
    fn test_parse_json_schema() {
        let spec = SchemaSpec::from_json_str(
            r#"{"name": [{"rule": "required"}, {"rule": "min_length", "value": 2}]}"#,
        )
        .unwrap();
        assert_eq!(
            spec.fields["name"],
            vec![RuleSpec::Required, RuleSpec::MinLength { value: 2 }]
        );
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let err = SchemaSpec::from_json_str(r#"{"name": [{"rule": "shout"}]}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let spec = SchemaSpec::from_json_str(
            r#"{"code": [{"rule": "pattern", "regex": "[", "message": "bad"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            spec.build(&FormValues::new()),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_built_schema_validates() {
        let spec = SchemaSpec::from_toml_str(SIGNUP).unwrap();
        let form = values(json!({
            "email": "",
            "password": "secret123",
            "confirm": "secret12",
            "age": "17",
            "bio": "short",
            "employee_id": "EMP-7"
        }));

        let result = validate_form(&form, &spec.build(&form).unwrap());
        assert!(!result.is_valid);
        assert_eq!(result.errors["email"], REQUIRED_MESSAGE);
        assert_eq!(result.errors["password"], PASSWORD_UPPERCASE_MESSAGE);
        assert_eq!(result.errors["confirm"], "Does not match Password");
        assert_eq!(result.errors["age"], "Must be at least 18");
        assert!(!result.errors.contains_key("bio"));
        assert!(!result.errors.contains_key("employee_id"));
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let spec = SchemaSpec::from_toml_str(SIGNUP).unwrap();
        let schema = spec.build(&FormValues::new()).unwrap();
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["email", "password", "confirm", "age", "bio", "employee_id"]
        );

        let spec = SchemaSpec::from_json_str(r#"{"zip": [{"rule": "required"}], "city": [{"rule": "required"}]}"#).unwrap();
        let result = validate_form(&FormValues::new(), &spec.build(&FormValues::new()).unwrap());
        assert_eq!(result.errors.keys().collect::<Vec<_>>(), vec!["zip", "city"]);
    }

    #[test]
    fn test_match_field_against_missing_field_compares_with_null() {
        let spec = SchemaSpec::from_json_str(r#"{"confirm": [{"rule": "match_field", "field": "password"}]}"#).unwrap();
        let form = values(json!({"confirm": "x"}));
        let result = validate_form(&form, &spec.build(&form).unwrap());
        assert_eq!(result.errors["confirm"], "Does not match password");
    }
}
