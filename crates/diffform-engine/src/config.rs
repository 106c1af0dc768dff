//! Form configuration
//!
//! [`FormConfig`] carries the closures a form needs (message formatting,
//! per-field equality) together with the plain-data [`FormPolicy`] that
//! decides initial touched state and when validation becomes visible.
//! Policies are serde types, so they can live in JSON or TOML settings.
//!
//! ```
//! use diffform_engine::config::{FormConfig, FormPolicy, ShowValidationOn, UntouchOn};
//!
//! let policy = FormPolicy::from_toml_str(r#"
//!     init_touched = { email = true }
//!     show_validation_on = "always"
//!     untouch_on = "never"
//! "#).unwrap();
//!
//! let config = FormConfig::new().with_policy(policy);
//! assert_eq!(config.policy().show_validation_on, ShowValidationOn::Always);
//! assert_eq!(config.policy().untouch_on, UntouchOn::Never);
//! ```

use crate::error::PolicyError;
use diffform_schema::{Issue, default_format_error_message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Equality used to decide whether a value differs from upstream
pub type EqualityFn = Rc<dyn Fn(&Value, &Value) -> bool>;

/// Turns a field's issues into the message shown to the user
pub type FormatErrorFn = Rc<dyn Fn(&[Issue], &str) -> String>;

/// Initial touched state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitTouched {
	/// Same flag for every field
	All(bool),
	/// Per-field flags; unlisted fields start untouched
	Fields(HashMap<String, bool>),
}

impl Default for InitTouched {
	fn default() -> Self {
		Self::All(false)
	}
}

impl InitTouched {
	pub fn is_touched(&self, field: &str) -> bool {
		match self {
			Self::All(flag) => *flag,
			Self::Fields(fields) => fields.get(field).copied().unwrap_or(false),
		}
	}
}

/// When a field's error message becomes visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowValidationOn {
	#[default]
	Touched,
	Always,
}

/// Which interaction clears a field's touched flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntouchOn {
	#[default]
	Focus,
	Change,
	Never,
}

/// Serializable subset of the form configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormPolicy {
	pub init_touched: InitTouched,
	pub show_validation_on: ShowValidationOn,
	pub untouch_on: UntouchOn,
}

impl FormPolicy {
	/// # Examples
	///
	/// ```
	/// use diffform_engine::config::{FormPolicy, InitTouched, UntouchOn};
	///
	/// let policy = FormPolicy::from_json_str(r#"{"init_touched": true, "untouch_on": "change"}"#).unwrap();
	/// assert_eq!(policy.init_touched, InitTouched::All(true));
	/// assert_eq!(policy.untouch_on, UntouchOn::Change);
	/// ```
	pub fn from_json_str(source: &str) -> Result<Self, PolicyError> {
		Ok(serde_json::from_str(source)?)
	}

	pub fn from_toml_str(source: &str) -> Result<Self, PolicyError> {
		Ok(toml::from_str(source)?)
	}
}

/// Form-wide configuration; every setting is optional
#[derive(Clone)]
pub struct FormConfig {
	format_error_message: FormatErrorFn,
	is_equal: HashMap<String, EqualityFn>,
	policy: FormPolicy,
}

impl Default for FormConfig {
	fn default() -> Self {
		Self {
			format_error_message: Rc::new(default_format_error_message),
			is_equal: HashMap::new(),
			policy: FormPolicy::default(),
		}
	}
}

impl fmt::Debug for FormConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut equality_fields: Vec<_> = self.is_equal.keys().collect();
		equality_fields.sort();
		f.debug_struct("FormConfig")
			.field("policy", &self.policy)
			.field("is_equal", &equality_fields)
			.finish_non_exhaustive()
	}
}

impl FormConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn format_error_message<F>(mut self, format: F) -> Self
	where
		F: Fn(&[Issue], &str) -> String + 'static,
	{
		self.format_error_message = Rc::new(format);
		self
	}

	/// Register a form-level equality for `field`
	///
	/// An `is_equal` passed when binding the field takes precedence over this.
	pub fn is_equal<F>(mut self, field: impl Into<String>, is_equal: F) -> Self
	where
		F: Fn(&Value, &Value) -> bool + 'static,
	{
		self.is_equal.insert(field.into(), Rc::new(is_equal));
		self
	}

	pub fn init_touched(mut self, init_touched: InitTouched) -> Self {
		self.policy.init_touched = init_touched;
		self
	}

	pub fn show_validation_on(mut self, show: ShowValidationOn) -> Self {
		self.policy.show_validation_on = show;
		self
	}

	pub fn untouch_on(mut self, untouch: UntouchOn) -> Self {
		self.policy.untouch_on = untouch;
		self
	}

	/// Replace the plain-data settings, keeping the closures
	pub fn with_policy(mut self, policy: FormPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn policy(&self) -> &FormPolicy {
		&self.policy
	}

	pub(crate) fn default_show_validation_on(&self) -> ShowValidationOn {
		self.policy.show_validation_on
	}

	pub(crate) fn default_untouch_on(&self) -> UntouchOn {
		self.policy.untouch_on
	}

	pub(crate) fn initial_touched(&self) -> &InitTouched {
		&self.policy.init_touched
	}

	pub(crate) fn equality_for(&self, field: &str) -> Option<EqualityFn> {
		self.is_equal.get(field).cloned()
	}

	pub(crate) fn format(&self, issues: &[Issue], field: &str) -> String {
		(self.format_error_message)(issues, field)
	}
}
