//! Cogniwork Validator - 表单校验
//!
//! - `rules`：纯函数式的校验规则，失败时返回面向用户的消息
//! - `validator`：把规则组合成 schema，校验单个字段或整个表单
//! - `form`：跟踪值、错误和触碰状态的表单控制器
//! - `schema`：可从 TOML / JSON 加载的声明式 schema

pub mod error;
pub mod form;
pub mod rules;
pub mod schema;
pub mod validator;

pub use error::{SchemaError, SchemaResult};
pub use form::{FieldErrorStates, FormController, TouchedFields};
pub use rules::{BoxedRule, Rule, RuleExt};
pub use schema::{RuleSpec, SchemaSpec};
pub use validator::{validate_field, validate_form, FieldErrors, FormValidation, FormValues, Schema};
