//! Structured validation issues

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Message used when a failure carries no issue for the field being formatted.
pub const DEFAULT_ERROR_MESSAGE: &str = "Invalid value";

/// Machine-readable category of a validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
	Required,
	TooShort,
	TooLong,
	InvalidEmail,
	InvalidUrl,
	PatternMismatch,
	InvalidChoice,
	InvalidType,
	Custom(String),
}

/// A single validation issue
///
/// `path` names the field (and optionally nested segments) the issue is
/// about. An empty path means the issue concerns the record as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
	pub path: Vec<String>,
	pub code: IssueCode,
	pub message: String,
}

impl Issue {
	/// Create an issue attached to a single top-level field
	///
	/// # Examples
	///
	/// ```
	/// use diffform_schema::{Issue, IssueCode};
	///
	/// let issue = Issue::new("email", IssueCode::InvalidEmail, "Enter a valid email address");
	/// assert_eq!(issue.field(), Some("email"));
	/// ```
	pub fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
		Self {
			path: vec![field.into()],
			code,
			message: message.into(),
		}
	}

	/// Create an issue that is not tied to any field
	pub fn record(code: IssueCode, message: impl Into<String>) -> Self {
		Self {
			path: Vec::new(),
			code,
			message: message.into(),
		}
	}

	/// The top-level field this issue concerns, if any
	pub fn field(&self) -> Option<&str> {
		self.path.first().map(String::as_str)
	}
}

impl fmt::Display for Issue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.path.is_empty() {
			write!(f, "{}", self.message)
		} else {
			write!(f, "{}: {}", self.path.join("."), self.message)
		}
	}
}

/// A failed validation with every issue that was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
	pub issues: Vec<Issue>,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn render_issues(issues: &[Issue]) -> String {
	if issues.is_empty() {
		return "validation failed".to_string();
	}
	issues
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

impl ValidationError {
	pub fn new(issues: Vec<Issue>) -> Self {
		Self { issues }
	}

	pub fn single(issue: Issue) -> Self {
		Self {
			issues: vec![issue],
		}
	}

	/// Issues whose path starts at `field`
	///
	/// # Examples
	///
	/// ```
	/// use diffform_schema::{Issue, IssueCode, ValidationError};
	///
	/// let err = ValidationError::new(vec![
	///     Issue::new("name", IssueCode::Required, "This field is required."),
	///     Issue::new("email", IssueCode::InvalidEmail, "Enter a valid email address"),
	/// ]);
	/// assert_eq!(err.for_field("email").len(), 1);
	/// assert!(err.for_field("age").is_empty());
	/// ```
	pub fn for_field(&self, field: &str) -> Vec<&Issue> {
		self.issues
			.iter()
			.filter(|issue| issue.field() == Some(field))
			.collect()
	}

	pub fn first_message(&self) -> Option<&str> {
		self.issues.first().map(|issue| issue.message.as_str())
	}

	/// Group messages by top-level field; record-level issues are skipped
	pub fn field_errors(&self) -> HashMap<String, Vec<String>> {
		let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
		for issue in &self.issues {
			if let Some(field) = issue.field() {
				grouped
					.entry(field.to_string())
					.or_default()
					.push(issue.message.clone());
			}
		}
		grouped
	}

	pub fn is_empty(&self) -> bool {
		self.issues.is_empty()
	}
}

impl From<Issue> for ValidationError {
	fn from(issue: Issue) -> Self {
		Self::single(issue)
	}
}

/// Default message formatter: the first issue's message, or
/// [`DEFAULT_ERROR_MESSAGE`] when there are none.
///
/// # Examples
///
/// ```
/// use diffform_schema::{default_format_error_message, Issue, IssueCode, DEFAULT_ERROR_MESSAGE};
///
/// let issues = vec![Issue::new("email", IssueCode::InvalidEmail, "Enter a valid email address")];
/// assert_eq!(default_format_error_message(&issues, "email"), "Enter a valid email address");
/// assert_eq!(default_format_error_message(&[], "email"), DEFAULT_ERROR_MESSAGE);
/// ```
pub fn default_format_error_message(issues: &[Issue], _field: &str) -> String {
	issues
		.first()
		.map(|issue| issue.message.clone())
		.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}
