use crate::error::{SchemaError, SchemaResult};
use cogniwork_core::value::{format_number, is_present, length, to_number, to_text};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const NUMBER_MESSAGE: &str = "Please enter a valid number";
pub const URL_MESSAGE: &str = "Please enter a valid URL";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number";

pub const PASSWORD_REQUIRED_MESSAGE: &str = "Password is required";
pub const PASSWORD_LENGTH_MESSAGE: &str = "Password must be at least 8 characters";
pub const PASSWORD_UPPERCASE_MESSAGE: &str = "Password must contain at least one uppercase letter";
pub const PASSWORD_LOWERCASE_MESSAGE: &str = "Password must contain at least one lowercase letter";
pub const PASSWORD_DIGIT_MESSAGE: &str = "Password must contain at least one number";

const PASSWORD_MIN_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]+$").expect("valid phone regex"));

/// 校验规则
///
/// 通过返回 `None`，失败返回面向用户的错误消息。闭包
/// `Fn(&Value) -> Option<String>` 自动实现该 trait。
pub trait Rule: Send + Sync {
    fn check(&self, value: &Value) -> Option<String>;
}

impl<F> Rule for F
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    fn check(&self, value: &Value) -> Option<String> {
        self(value)
    }
}

pub type BoxedRule = Box<dyn Rule>;

pub trait RuleExt: Rule + Sized + 'static {
    fn boxed(self) -> BoxedRule {
        Box::new(self)
    }
}

impl<R: Rule + Sized + 'static> RuleExt for R {}

/// 必填：null、false、0 以及去除空白后为空的字符串都不通过
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Rule for Required {
    fn check(&self, value: &Value) -> Option<String> {
        let blank = match value {
            Value::String(s) => s.trim().is_empty(),
            other => !is_present(other),
        };
        blank.then(|| REQUIRED_MESSAGE.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Rule for Email {
    fn check(&self, value: &Value) -> Option<String> {
        if is_present(value) && !EMAIL_RE.is_match(&to_text(value)) {
            return Some(EMAIL_MESSAGE.to_string());
        }
        None
    }
}

/// 最小长度，没有长度的值（数字、布尔）直接通过
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Rule for MinLength {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return None;
        }
        match length(value) {
            Some(len) if len < self.0 => Some(format!("Must be at least {} characters", self.0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Rule for MaxLength {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return None;
        }
        match length(value) {
            Some(len) if len > self.0 => Some(format!("Must be no more than {} characters", self.0)),
            _ => None,
        }
    }
}

/// 密码强度，按固定顺序只返回第一条未满足的要求
#[derive(Debug, Clone, Copy, Default)]
pub struct Password;

impl Rule for Password {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return Some(PASSWORD_REQUIRED_MESSAGE.to_string());
        }

        let text = to_text(value);
        let message = if text.chars().count() < PASSWORD_MIN_LENGTH {
            PASSWORD_LENGTH_MESSAGE
        } else if !text.chars().any(|c| c.is_ascii_uppercase()) {
            PASSWORD_UPPERCASE_MESSAGE
        } else if !text.chars().any(|c| c.is_ascii_lowercase()) {
            PASSWORD_LOWERCASE_MESSAGE
        } else if !text.chars().any(|c| c.is_ascii_digit()) {
            PASSWORD_DIGIT_MESSAGE
        } else {
            return None;
        };
        Some(message.to_string())
    }
}

/// 与另一个字段的值严格相等
#[derive(Debug, Clone)]
pub struct MatchField {
    name: String,
    other: Value,
}

impl MatchField {
    pub fn new(name: impl Into<String>, other: Value) -> Self {
        Self {
            name: name.into(),
            other,
        }
    }
}

impl Rule for MatchField {
    fn check(&self, value: &Value) -> Option<String> {
        if strict_equals(value, &self.other) {
            None
        } else {
            Some(format!("Does not match {}", self.name))
        }
    }
}

/// 数字按数值比较（1 与 1.0 相等），其他类型按结构比较
fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Rule for Number {
    fn check(&self, value: &Value) -> Option<String> {
        if is_present(value) && to_number(value).is_none() {
            return Some(NUMBER_MESSAGE.to_string());
        }
        None
    }
}

/// 数值下限；无法转换为数值的输入按 `Number` 的消息判为失败
#[derive(Debug, Clone, Copy)]
pub struct Min(pub f64);

impl Rule for Min {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return None;
        }
        match to_number(value) {
            None => Some(NUMBER_MESSAGE.to_string()),
            Some(n) if n < self.0 => Some(format!("Must be at least {}", format_number(self.0))),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Max(pub f64);

impl Rule for Max {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return None;
        }
        match to_number(value) {
            None => Some(NUMBER_MESSAGE.to_string()),
            Some(n) if n > self.0 => Some(format!("Must be no more than {}", format_number(self.0))),
            Some(_) => None,
        }
    }
}

/// 绝对 URL；解析失败转换为校验消息
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl Rule for Url {
    fn check(&self, value: &Value) -> Option<String> {
        if !is_present(value) {
            return None;
        }
        match ::url::Url::parse(&to_text(value)) {
            Ok(_) => None,
            Err(e) => {
                tracing::trace!(error = %e, "URL rejected");
                Some(URL_MESSAGE.to_string())
            }
        }
    }
}

/// 电话号码：只允许数字、空白、`-`、`+`、括号
#[derive(Debug, Clone, Copy, Default)]
pub struct Phone;

impl Rule for Phone {
    fn check(&self, value: &Value) -> Option<String> {
        if is_present(value) && !PHONE_RE.is_match(&to_text(value)) {
            return Some(PHONE_MESSAGE.to_string());
        }
        None
    }
}

/// 自定义正则
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    message: String,
}

impl Pattern {
    pub fn new(pattern: &str, message: impl Into<String>) -> SchemaResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            message: message.into(),
        })
    }
}

impl Rule for Pattern {
    fn check(&self, value: &Value) -> Option<String> {
        if is_present(value) && !self.regex.is_match(&to_text(value)) {
            return Some(self.message.clone());
        }
        None
    }
}

// ========== 工厂函数 ==========

pub fn required() -> Required {
    Required
}

pub fn email() -> Email {
    Email
}

pub fn min_length(min: usize) -> MinLength {
    MinLength(min)
}

pub fn max_length(max: usize) -> MaxLength {
    MaxLength(max)
}

pub fn password() -> Password {
    Password
}

pub fn match_field(name: impl Into<String>, other: Value) -> MatchField {
    MatchField::new(name, other)
}

pub fn number() -> Number {
    Number
}

pub fn min(min: f64) -> Min {
    Min(min)
}

pub fn max(max: f64) -> Max {
    Max(max)
}

pub fn url() -> Url {
    Url
}

pub fn phone() -> Phone {
    Phone
}

pub fn pattern(pattern: &str, message: impl Into<String>) -> SchemaResult<Pattern> {
    Pattern::new(pattern, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required() {
        assert_eq!(required().check(&json!("")), Some(REQUIRED_MESSAGE.to_string()));
        assert_eq!(required().check(&json!("   ")), Some(REQUIRED_MESSAGE.to_string()));
        assert_eq!(required().check(&Value::Null), Some(REQUIRED_MESSAGE.to_string()));
        assert_eq!(required().check(&json!(false)), Some(REQUIRED_MESSAGE.to_string()));
        assert_eq!(required().check(&json!(0)), Some(REQUIRED_MESSAGE.to_string()));
        assert_eq!(required().check(&json!("x")), None);
        assert_eq!(required().check(&json!(7)), None);
        assert_eq!(required().check(&json!(["a"])), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(email().check(&json!("jane@cogniwork.dev")), None);
        assert_eq!(email().check(&json!("")), None);
        assert_eq!(email().check(&Value::Null), None);
        for bad in ["jane", "jane@host", "jane @host.com", "a@b@c.com", "@host.com"] {
            assert_eq!(email().check(&json!(bad)), Some(EMAIL_MESSAGE.to_string()), "{}", bad);
        }
    }

    #[test]
    fn test_min_and_max_length() {
        assert_eq!(min_length(3).check(&json!("ab")), Some("Must be at least 3 characters".into()));
        assert_eq!(min_length(3).check(&json!("abc")), None);
        assert_eq!(min_length(3).check(&json!("")), None);
        assert_eq!(min_length(3).check(&Value::Null), None);
        assert_eq!(min_length(3).check(&json!(12)), None);

        assert_eq!(max_length(2).check(&json!("abc")), Some("Must be no more than 2 characters".into()));
        assert_eq!(max_length(2).check(&json!(["a", "b"])), None);
        assert_eq!(max_length(1).check(&json!(["a", "b"])), Some("Must be no more than 1 characters".into()));
    }

    #[test]
    fn test_password_reports_first_unmet_condition() {
        assert_eq!(password().check(&json!("Abc12345")), None);
        assert_eq!(password().check(&json!("abc12345")), Some(PASSWORD_UPPERCASE_MESSAGE.into()));
        assert_eq!(password().check(&json!("ABC12345")), Some(PASSWORD_LOWERCASE_MESSAGE.into()));
        assert_eq!(password().check(&json!("Abcdefgh")), Some(PASSWORD_DIGIT_MESSAGE.into()));
        assert_eq!(password().check(&json!("Ab1")), Some(PASSWORD_LENGTH_MESSAGE.into()));
        assert_eq!(password().check(&json!("")), Some(PASSWORD_REQUIRED_MESSAGE.into()));
        assert_eq!(password().check(&Value::Null), Some(PASSWORD_REQUIRED_MESSAGE.into()));
    }

    #[test]
    fn test_match_field() {
        let rule = match_field("password", json!("Secret123"));
        assert_eq!(rule.check(&json!("Secret123")), None);
        assert_eq!(rule.check(&json!("secret123")), Some("Does not match password".into()));
        assert_eq!(rule.check(&Value::Null), Some("Does not match password".into()));

        let numeric = match_field("count", json!(1));
        assert_eq!(numeric.check(&json!(1.0)), None);
        assert_eq!(numeric.check(&json!("1")), Some("Does not match count".into()));
    }

    #[test]
    fn test_number() {
        assert_eq!(number().check(&json!("42")), None);
        assert_eq!(number().check(&json!(" -3.5 ")), None);
        assert_eq!(number().check(&json!(17)), None);
        assert_eq!(number().check(&json!("")), None);
        assert_eq!(number().check(&json!("4x")), Some(NUMBER_MESSAGE.into()));
        assert_eq!(number().check(&json!("Infinity")), Some(NUMBER_MESSAGE.into()));
    }

    #[test]
    fn test_min_and_max() {
        assert_eq!(min(5.0).check(&json!("4")), Some("Must be at least 5".into()));
        assert_eq!(min(5.0).check(&json!(5)), None);
        assert_eq!(min(0.5).check(&json!("0.25")), Some("Must be at least 0.5".into()));
        assert_eq!(min(5.0).check(&json!("")), None);
        assert_eq!(min(5.0).check(&json!("abc")), Some(NUMBER_MESSAGE.into()));

        assert_eq!(max(10.0).check(&json!(11)), Some("Must be no more than 10".into()));
        assert_eq!(max(10.0).check(&json!("10")), None);
        assert_eq!(max(10.0).check(&json!("ten")), Some(NUMBER_MESSAGE.into()));
    }

    #[test]
    fn test_url() {
        assert_eq!(url().check(&json!("https://cogniwork.dev/reviews?q=1")), None);
        assert_eq!(url().check(&json!("mailto:hr@cogniwork.dev")), None);
        assert_eq!(url().check(&json!("")), None);
        assert_eq!(url().check(&json!("cogniwork.dev")), Some(URL_MESSAGE.into()));
        assert_eq!(url().check(&json!("/relative/path")), Some(URL_MESSAGE.into()));
    }

    #[test]
    fn test_phone() {
        assert_eq!(phone().check(&json!("+1 (555) 010-9999")), None);
        assert_eq!(phone().check(&json!("")), None);
        assert_eq!(phone().check(&json!("555-CALL")), Some(PHONE_MESSAGE.into()));
        assert_eq!(phone().check(&json!("555.0100")), Some(PHONE_MESSAGE.into()));
    }

    #[test]
    fn test_pattern() {
        let rule = pattern(r"^EMP-\d{4}$", "Employee ID must look like EMP-0000").unwrap();
        assert_eq!(rule.check(&json!("EMP-0042")), None);
        assert_eq!(rule.check(&json!("emp-42")), Some("Employee ID must look like EMP-0000".into()));

        let err = pattern("(unclosed", "x").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_closures_are_rules() {
        let even = |value: &Value| -> Option<String> {
            match value.as_i64() {
                Some(n) if n % 2 != 0 => Some("Must be even".to_string()),
                _ => None,
            }
        };
        assert_eq!(even.check(&json!(3)), Some("Must be even".into()));
        assert_eq!(even.boxed().check(&json!(4)), None);
    }
}
