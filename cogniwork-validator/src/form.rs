//! 有状态的表单控制器
//!
//! 每个字段的状态只有两种：未触碰 -> 已触碰（失焦或提交后）。
//! 已触碰的字段只能通过 `reset` 回到未触碰。错误只在字段已触碰时才需要展示。

use crate::error::SchemaResult;
use crate::schema::SchemaSpec;
use crate::validator::{validate_form, FormValues, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

/// 字段 -> 最近一次校验结果；`None` 表示校验通过，未校验的字段不在表中
pub type FieldErrorStates = BTreeMap<String, Option<String>>;

/// 字段 -> 是否已触碰
pub type TouchedFields = BTreeMap<String, bool>;

/// 表单控制器
///
/// # 示例
///
/// ```
/// use cogniwork_validator::{FormController, Schema, rules::{required, email}};
/// use serde_json::json;
///
/// let schema = Schema::new().rule("email", required()).rule("email", email());
/// let mut form = FormController::new(Default::default(), schema);
///
/// form.handle_change("email", json!("x"));
/// assert_eq!(form.visible_error("email"), None);
///
/// form.handle_blur("email");
/// assert_eq!(form.visible_error("email"), Some("Please enter a valid email address"));
/// ```
///
/// 用 [`FormController::from_spec`] 创建时，每次校验前都会按当前值重建 schema，
/// 因此 `match_field` 总是和被引用字段的最新值比较。
#[derive(Debug)]
pub struct FormController {
    schema: Schema,
    spec: Option<SchemaSpec>,
    initial_values: FormValues,
    values: FormValues,
    errors: FieldErrorStates,
    touched: TouchedFields,
}

impl FormController {
    pub fn new(initial_values: FormValues, schema: Schema) -> Self {
        Self {
            schema,
            spec: None,
            values: initial_values.clone(),
            initial_values,
            errors: FieldErrorStates::new(),
            touched: TouchedFields::new(),
        }
    }

    /// 由声明式 schema 创建，规则中的 pattern 在这里编译并检查
    pub fn from_spec(initial_values: FormValues, spec: SchemaSpec) -> SchemaResult<Self> {
        let schema = spec.build(&initial_values)?;
        let mut form = Self::new(initial_values, schema);
        form.spec = Some(spec);
        Ok(form)
    }

    /// 替换 schema，之后的校验使用新规则
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
        self.spec = None;
    }

    fn refresh_schema(&mut self) {
        let Some(spec) = &self.spec else {
            return;
        };
        match spec.build(&self.values) {
            Ok(schema) => self.schema = schema,
            Err(e) => tracing::warn!(error = %e, "Failed to rebuild schema, keeping the previous one"),
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FieldErrorStates {
        &self.errors
    }

    pub fn touched(&self) -> &TouchedFields {
        &self.touched
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.get(field).copied().unwrap_or(false)
    }

    /// 字段当前的错误消息（不论是否已触碰）
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).and_then(|e| e.as_deref())
    }

    /// 应该展示给用户的错误：只有已触碰的字段才返回
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.is_touched(field) {
            self.error(field)
        } else {
            None
        }
    }

    /// 输入变化
    ///
    /// 未触碰的字段只更新值，不计算错误；已触碰的字段立即重新校验。
    pub fn handle_change(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
        if self.is_touched(field) {
            self.refresh_schema();
            let value = self.values.get(field).unwrap_or(&Value::Null);
            let error = self.schema.validate_field(field, value);
            tracing::trace!(field, ?error, "Revalidated touched field on change");
            self.errors.insert(field.to_string(), error);
        }
    }

    /// 失焦：标记为已触碰，并用当前值强制校验
    pub fn handle_blur(&mut self, field: &str) {
        self.touched.insert(field.to_string(), true);
        self.refresh_schema();
        let value = self.values.get(field).unwrap_or(&Value::Null);
        let error = self.schema.validate_field(field, value);
        tracing::trace!(field, ?error, "Validated field on blur");
        self.errors.insert(field.to_string(), error);
    }

    /// 提交
    ///
    /// 校验通过时以当前值调用 `on_submit` 并返回 `true`，错误和触碰状态不变。
    /// 校验失败时整体替换错误表，并把 schema 中的所有字段标记为已触碰，返回 `false`。
    pub fn handle_submit<F>(&mut self, on_submit: F) -> bool
    where
        F: FnOnce(&FormValues),
    {
        self.refresh_schema();
        let validation = validate_form(&self.values, &self.schema);

        if validation.is_valid {
            tracing::debug!("Form submitted");
            on_submit(&self.values);
            return true;
        }

        tracing::debug!(errors = validation.errors.len(), "Form submission rejected");
        self.errors = validation
            .errors
            .into_iter()
            .map(|(field, message)| (field, Some(message)))
            .collect();
        for field in self.schema.field_names() {
            self.touched.insert(field.to_string(), true);
        }
        false
    }

    /// 恢复初始值，清空错误与触碰状态
    pub fn reset(&mut self) {
        self.values = self.initial_values.clone();
        self.errors.clear();
        self.touched.clear();
    }

    /// 直接替换所有值，不触发校验
    pub fn set_values(&mut self, values: FormValues) {
        self.values = values;
    }
}
