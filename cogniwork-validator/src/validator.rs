use crate::rules::{BoxedRule, Rule, RuleExt};
use serde::Serialize;
use serde_json::{Map, Value};
use indexmap::IndexMap;

/// 表单值：字段名 -> 当前值，保持插入顺序
pub type FormValues = Map<String, Value>;

/// 校验失败的字段及其消息，按 schema 声明顺序
pub type FieldErrors = IndexMap<String, String>;

/// 表单 schema：字段名 -> 有序规则列表
///
/// 字段按声明顺序保存；同一字段的规则按添加顺序执行。
#[derive(Default)]
pub struct Schema {
    fields: Vec<(String, Vec<BoxedRule>)>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<(&str, usize)> = self
            .fields
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.len()))
            .collect();
        f.debug_struct("Schema").field("fields", &fields).finish()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明字段（若已存在则替换其规则）
    pub fn field(mut self, name: impl Into<String>, rules: Vec<BoxedRule>) -> Self {
        self.set_rules(name, rules);
        self
    }

    /// 向字段追加一条规则，字段不存在时自动声明
    pub fn rule(mut self, name: impl Into<String>, rule: impl Rule + 'static) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, rules)) => rules.push(rule.boxed()),
            None => self.fields.push((name, vec![rule.boxed()])),
        }
        self
    }

    pub fn set_rules(&mut self, name: impl Into<String>, rules: Vec<BoxedRule>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name, rules)),
        }
    }

    pub fn rules_for(&self, name: &str) -> Option<&[BoxedRule]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules_for(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 校验单个字段；schema 中未声明的字段总是通过
    pub fn validate_field(&self, name: &str, value: &Value) -> Option<String> {
        self.rules_for(name).and_then(|rules| validate_field(value, rules))
    }
}

/// 整个表单的校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: FieldErrors,
}

/// 依次执行规则，返回第一条失败消息
///
/// 第一条失败之后的规则不会被执行。
pub fn validate_field(value: &Value, rules: &[BoxedRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.check(value))
}

/// 校验 schema 中声明的每个字段
///
/// 缺失的值按 null 处理；`values` 中未在 schema 声明的字段不参与校验。
pub fn validate_form(values: &FormValues, schema: &Schema) -> FormValidation {
    let mut errors = FieldErrors::new();

    for (field, rules) in &schema.fields {
        let value = values.get(field).unwrap_or(&Value::Null);
        if let Some(message) = validate_field(value, rules) {
            errors.insert(field.clone(), message);
        }
    }

    tracing::debug!(fields = schema.len(), failed = errors.len(), "Form validated");

    FormValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
