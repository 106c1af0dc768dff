//! String format validators used by [`FieldRule`](crate::FieldRule)

use regex::Regex;
use std::sync::LazyLock;

// Pragmatic email shape: local part, single @, dotted domain with a 2+ letter TLD.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
		.expect("EMAIL_REGEX: invalid regex pattern")
});

// HTTP/HTTPS URL with optional port, path, query and fragment.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^https?://[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)*(:[0-9]{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#[^\s]*)?$",
	)
	.expect("URL_REGEX: invalid regex pattern")
});

/// Validates email addresses
///
/// # Examples
///
/// ```
/// use diffform_schema::validators::EmailValidator;
///
/// let validator = EmailValidator::new();
/// assert!(validator.validate("johndoe@example.com").is_ok());
/// assert!(validator.validate("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
	message: Option<String>,
}

impl EmailValidator {
	pub fn new() -> Self {
		Self { message: None }
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &str) -> Result<(), String> {
		if EMAIL_REGEX.is_match(value) {
			Ok(())
		} else {
			Err(self
				.message
				.clone()
				.unwrap_or_else(|| "Enter a valid email address".to_string()))
		}
	}
}

/// Validates HTTP and HTTPS URLs
///
/// # Examples
///
/// ```
/// use diffform_schema::validators::UrlValidator;
///
/// let validator = UrlValidator::new();
/// assert!(validator.validate("https://example.com/path?q=1").is_ok());
/// assert!(validator.validate("ftp://example.com").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
	message: Option<String>,
}

impl UrlValidator {
	pub fn new() -> Self {
		Self { message: None }
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &str) -> Result<(), String> {
		if URL_REGEX.is_match(value) {
			Ok(())
		} else {
			Err(self
				.message
				.clone()
				.unwrap_or_else(|| "Enter a valid URL".to_string()))
		}
	}
}

/// Validates a value against a caller-supplied regular expression
///
/// The pattern must match the whole value, alternations included.
#[derive(Debug, Clone)]
pub struct PatternValidator {
	regex: Regex,
	message: Option<String>,
}

impl PatternValidator {
	/// # Errors
	///
	/// Returns the regex compile error for an invalid pattern.
	///
	/// # Examples
	///
	/// ```
	/// use diffform_schema::validators::PatternValidator;
	///
	/// let validator = PatternValidator::new("[A-Z]{3}").unwrap();
	/// assert!(validator.validate("ABC").is_ok());
	/// assert!(validator.validate("ABCD").is_err());
	/// ```
	pub fn new(pattern: &str) -> Result<Self, regex::Error> {
		// Anchors already in the pattern are redundant inside the group.
		Ok(Self {
			regex: Regex::new(&format!("^(?:{pattern})$"))?,
			message: None,
		})
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &str) -> Result<(), String> {
		if self.regex.is_match(value) {
			Ok(())
		} else {
			Err(self
				.message
				.clone()
				.unwrap_or_else(|| "Enter a value in the expected format".to_string()))
		}
	}
}
