//! Declarative reference schema
//!
//! [`FieldSchema`] is an ordered list of [`FieldRule`]s plus optional
//! record-level checks. Each rule cleans one value: it may trim strings,
//! substitute a default for empty input and coerce numeric strings, then runs
//! its checks and reports every issue it finds.

use crate::issue::{Issue, IssueCode, ValidationError, ValidationResult};
use crate::schema::{Record, Schema};
use crate::validators::{EmailValidator, PatternValidator, UrlValidator};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A caller-supplied check on one cleaned value; `Err` carries the message
pub type CustomCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

type RecordCheck = Arc<dyn Fn(&Record) -> Result<(), Issue> + Send + Sync>;

const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
	Any,
	String,
	Number,
	Boolean,
	Array,
}

/// Rules for a single field
#[derive(Clone)]
pub struct FieldRule {
	name: String,
	required: bool,
	required_message: Option<String>,
	trim: bool,
	default: Option<Value>,
	kind: ValueKind,
	min_length: Option<usize>,
	max_length: Option<usize>,
	email: Option<EmailValidator>,
	url: Option<UrlValidator>,
	pattern: Option<PatternValidator>,
	choices: Option<Vec<Value>>,
	custom: Vec<(String, CustomCheck)>,
}

impl fmt::Debug for FieldRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldRule")
			.field("name", &self.name)
			.field("required", &self.required)
			.field("kind", &self.kind)
			.field("custom_checks", &self.custom.len())
			.finish_non_exhaustive()
	}
}

impl FieldRule {
	/// Create a required field with no further checks
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			required: true,
			required_message: None,
			trim: false,
			default: None,
			kind: ValueKind::Any,
			min_length: None,
			max_length: None,
			email: None,
			url: None,
			pattern: None,
			choices: None,
			custom: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn optional(mut self) -> Self {
		self.required = false;
		self
	}

	pub fn required_message(mut self, message: impl Into<String>) -> Self {
		self.required_message = Some(message.into());
		self
	}

	pub fn trim(mut self) -> Self {
		self.trim = true;
		self
	}

	/// Value substituted for empty input; a field with a default is optional
	pub fn default_value(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	pub fn string(mut self) -> Self {
		self.kind = ValueKind::String;
		self
	}

	/// Accept numbers; numeric strings are coerced to numbers
	pub fn number(mut self) -> Self {
		self.kind = ValueKind::Number;
		self
	}

	pub fn boolean(mut self) -> Self {
		self.kind = ValueKind::Boolean;
		self
	}

	pub fn array(mut self) -> Self {
		self.kind = ValueKind::Array;
		self
	}

	/// Minimum character count for strings, element count for arrays
	pub fn min_length(mut self, min: usize) -> Self {
		self.min_length = Some(min);
		self
	}

	pub fn max_length(mut self, max: usize) -> Self {
		self.max_length = Some(max);
		self
	}

	pub fn email(mut self) -> Self {
		self.email = Some(EmailValidator::new());
		self
	}

	pub fn email_with(mut self, validator: EmailValidator) -> Self {
		self.email = Some(validator);
		self
	}

	pub fn url(mut self) -> Self {
		self.url = Some(UrlValidator::new());
		self
	}

	pub fn pattern(mut self, validator: PatternValidator) -> Self {
		self.pattern = Some(validator);
		self
	}

	/// Restrict the value (or every element of an array value) to `choices`
	pub fn one_of(mut self, choices: impl IntoIterator<Item = Value>) -> Self {
		self.choices = Some(choices.into_iter().collect());
		self
	}

	/// Add a custom check; `code` becomes [`IssueCode::Custom`] on failure
	pub fn custom<F>(mut self, code: impl Into<String>, check: F) -> Self
	where
		F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.custom.push((code.into(), Arc::new(check)));
		self
	}

	pub fn is_optional(&self) -> bool {
		!self.required || self.default.is_some()
	}

	/// Clean a single value, reporting every issue found
	///
	/// # Examples
	///
	/// ```
	/// use diffform_schema::FieldRule;
	/// use serde_json::json;
	///
	/// let rule = FieldRule::new("name").trim().min_length(2);
	/// assert_eq!(rule.clean(&json!("  Jo ")).unwrap(), json!("Jo"));
	/// assert!(rule.clean(&json!("   ")).is_err());
	/// ```
	pub fn clean(&self, value: &Value) -> ValidationResult<Value> {
		let mut value = match value {
			Value::String(s) if self.trim => Value::String(s.trim().to_string()),
			other => other.clone(),
		};

		if is_empty(&value) {
			if let Some(default) = &self.default {
				return Ok(default.clone());
			}
			if self.required {
				let message = self
					.required_message
					.clone()
					.unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
				return Err(self.issue(IssueCode::Required, message).into());
			}
			return Ok(value);
		}

		value = self.coerce(value)?;

		let mut issues = Vec::new();
		self.check_length(&value, &mut issues);
		if let Value::String(s) = &value {
			if let Some(Err(message)) = self.email.as_ref().map(|v| v.validate(s)) {
				issues.push(self.issue(IssueCode::InvalidEmail, message));
			}
			if let Some(Err(message)) = self.url.as_ref().map(|v| v.validate(s)) {
				issues.push(self.issue(IssueCode::InvalidUrl, message));
			}
			if let Some(Err(message)) = self.pattern.as_ref().map(|v| v.validate(s)) {
				issues.push(self.issue(IssueCode::PatternMismatch, message));
			}
		}
		self.check_choices(&value, &mut issues);
		for (code, check) in &self.custom {
			if let Err(message) = check(&value) {
				issues.push(self.issue(IssueCode::Custom(code.clone()), message));
			}
		}

		if issues.is_empty() {
			Ok(value)
		} else {
			Err(ValidationError::new(issues))
		}
	}

	fn coerce(&self, value: Value) -> ValidationResult<Value> {
		let ok = match (self.kind, &value) {
			(ValueKind::Any, _)
			| (ValueKind::String, Value::String(_))
			| (ValueKind::Number, Value::Number(_))
			| (ValueKind::Boolean, Value::Bool(_))
			| (ValueKind::Array, Value::Array(_)) => true,
			(ValueKind::Number, Value::String(s)) => {
				if let Some(number) = parse_number(s.trim()) {
					return Ok(Value::Number(number));
				}
				false
			}
			_ => false,
		};
		if ok {
			Ok(value)
		} else {
			let expected = match self.kind {
				ValueKind::String => "a string",
				ValueKind::Number => "a number",
				ValueKind::Boolean => "a boolean",
				ValueKind::Array => "a list",
				ValueKind::Any => "a value",
			};
			Err(self
				.issue(IssueCode::InvalidType, format!("Expected {expected}."))
				.into())
		}
	}

	fn check_length(&self, value: &Value, issues: &mut Vec<Issue>) {
		let (len, unit) = match value {
			Value::String(s) => (s.chars().count(), "characters"),
			Value::Array(items) => (items.len(), "items"),
			_ => return,
		};
		if let Some(min) = self.min_length.filter(|min| len < *min) {
			issues.push(self.issue(
				IssueCode::TooShort,
				format!("Ensure this value has at least {min} {unit} (it has {len})."),
			));
		}
		if let Some(max) = self.max_length.filter(|max| len > *max) {
			issues.push(self.issue(
				IssueCode::TooLong,
				format!("Ensure this value has at most {max} {unit} (it has {len})."),
			));
		}
	}

	fn check_choices(&self, value: &Value, issues: &mut Vec<Issue>) {
		let Some(choices) = &self.choices else {
			return;
		};
		let candidates: Vec<&Value> = match value {
			Value::Array(items) => items.iter().collect(),
			other => vec![other],
		};
		for candidate in candidates {
			if !choices.contains(candidate) {
				issues.push(self.issue(
					IssueCode::InvalidChoice,
					format!(
						"Select a valid choice. {} is not one of the available choices.",
						display_value(candidate)
					),
				));
			}
		}
	}

	fn issue(&self, code: IssueCode, message: impl Into<String>) -> Issue {
		Issue::new(self.name.clone(), code, message)
	}
}

fn is_empty(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		_ => false,
	}
}

fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Ordered collection of field rules with optional record-level checks
///
/// Record-level checks run only once every field has cleaned successfully,
/// and see the cleaned record.
#[derive(Clone, Default)]
pub struct FieldSchema {
	rules: Vec<FieldRule>,
	checks: Vec<RecordCheck>,
}

/// Integers stay integers so typed targets with integer fields accept them
fn parse_number(text: &str) -> Option<serde_json::Number> {
	if let Ok(int) = text.parse::<i64>() {
		return Some(int.into());
	}
	if let Ok(uint) = text.parse::<u64>() {
		return Some(uint.into());
	}
	text.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
}

impl fmt::Debug for FieldSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldSchema")
			.field("rules", &self.rules)
			.field("record_checks", &self.checks.len())
			.finish()
	}
}

impl FieldSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a field rule
	pub fn field(mut self, rule: FieldRule) -> Self {
		match self.rules.iter_mut().find(|r| r.name == rule.name) {
			Some(existing) => *existing = rule,
			None => self.rules.push(rule),
		}
		self
	}

	/// Add a cross-field check, e.g. password confirmation
	///
	/// # Examples
	///
	/// ```
	/// use diffform_schema::{FieldRule, FieldSchema, Issue, IssueCode, Schema};
	/// use serde_json::json;
	/// use std::collections::HashMap;
	///
	/// let schema = FieldSchema::new()
	///     .field(FieldRule::new("password"))
	///     .field(FieldRule::new("confirm"))
	///     .check(|record| {
	///         if record.get("password") == record.get("confirm") {
	///             Ok(())
	///         } else {
	///             Err(Issue::new("confirm", IssueCode::Custom("mismatch".into()), "Passwords do not match"))
	///         }
	///     });
	///
	/// let record: HashMap<_, _> = [
	///     ("password".to_string(), json!("secret123")),
	///     ("confirm".to_string(), json!("different")),
	/// ].into();
	/// assert!(schema.parse(&record).is_err());
	/// ```
	pub fn check<F>(mut self, check: F) -> Self
	where
		F: Fn(&Record) -> Result<(), Issue> + Send + Sync + 'static,
	{
		self.checks.push(Arc::new(check));
		self
	}

	pub fn rule(&self, name: &str) -> Option<&FieldRule> {
		self.rules.iter().find(|r| r.name == name)
	}

	pub fn rules(&self) -> &[FieldRule] {
		&self.rules
	}
}

impl Schema for FieldSchema {
	type Output = Record;

	fn field_names(&self) -> Vec<String> {
		self.rules.iter().map(|r| r.name.clone()).collect()
	}

	/// Keys in `record` without a rule are dropped from the output
	fn parse(&self, record: &Record) -> ValidationResult<Record> {
		let mut cleaned = Record::with_capacity(self.rules.len());
		let mut issues = Vec::new();
		for rule in &self.rules {
			let value = record.get(&rule.name).unwrap_or(&Value::Null);
			match rule.clean(value) {
				Ok(value) => {
					cleaned.insert(rule.name.clone(), value);
				}
				Err(err) => issues.extend(err.issues),
			}
		}
		if !issues.is_empty() {
			return Err(ValidationError::new(issues));
		}

		for check in &self.checks {
			if let Err(issue) = check(&cleaned) {
				issues.push(issue);
			}
		}
		if issues.is_empty() {
			Ok(cleaned)
		} else {
			Err(ValidationError::new(issues))
		}
	}

	fn parse_field(&self, name: &str, value: &Value) -> ValidationResult<Value> {
		match self.rule(name) {
			Some(rule) => rule.clean(value),
			None => Ok(value.clone()),
		}
	}

	fn is_optional(&self, name: &str) -> bool {
		self.rule(name).is_none_or(FieldRule::is_optional)
	}
}
