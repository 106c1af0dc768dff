//! Form engine
//!
//! One [`FormEngine`] per mounted form instance. It owns the sparse diff
//! against the upstream record and the touched map; everything else is
//! derived on read.
//!
//! ```
//! use diffform_engine::{BindOptions, FormConfig, FormEngine};
//! use diffform_schema::{FieldRule, FieldSchema};
//! use serde_json::json;
//!
//! let schema = FieldSchema::new()
//!     .field(FieldRule::new("first_name").min_length(1))
//!     .field(FieldRule::new("email").email());
//! let upstream = [
//!     ("first_name".to_string(), json!("John")),
//!     ("email".to_string(), json!("johndoe@example.com")),
//! ].into();
//!
//! let form = FormEngine::new(schema, upstream, FormConfig::default());
//! let email = form.context().bind("email", BindOptions::new());
//! email.input_props.input("not-an-email");
//! assert!(form.is_form_dirty());
//!
//! let mut failed = false;
//! form.handle_submit(|_| unreachable!(), |err| {
//!     failed = err.issues.iter().any(|issue| issue.field() == Some("email"));
//! });
//! assert!(failed);
//! ```

use crate::config::FormConfig;
use crate::context::FormContext;
use crate::error::FormError;
use crate::state::{Shared, SubscriptionId};
use diffform_schema::{Record, Schema, ValidationError, ValidationResult};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Attributes for the native form element
///
/// Built-in browser validation is switched off so the schema is the only
/// source of truth for validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormProps {
	pub no_validate: bool,
}

pub const FORM_PROPS: FormProps = FormProps { no_validate: true };

impl FormProps {
	pub fn attributes(&self) -> Vec<(&'static str, String)> {
		if self.no_validate {
			vec![("novalidate", String::new())]
		} else {
			Vec::new()
		}
	}
}

/// Diff-against-upstream form state
pub struct FormEngine<S> {
	shared: Rc<Shared<S>>,
	context: FormContext<S>,
}

impl<S> fmt::Debug for FormEngine<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormEngine")
			.field("fields", &self.shared.fields())
			.field("config", &self.shared.config)
			.finish_non_exhaustive()
	}
}

impl<S: Schema + 'static> FormEngine<S> {
	/// Create a form over `upstream`
	///
	/// Upstream is read-only for the life of the engine; to track a new
	/// upstream record, construct a new engine.
	///
	/// # Panics
	///
	/// Panics when the schema declares no fields; see [`FormEngine::try_new`].
	pub fn new(schema: S, upstream: Record, config: FormConfig) -> Self {
		Self::try_new(schema, upstream, config).unwrap_or_else(|err| panic!("{err}"))
	}

	pub fn try_new(schema: S, upstream: Record, config: FormConfig) -> Result<Self, FormError> {
		let shared = Rc::new(Shared::new(schema, upstream, config)?);
		tracing::debug!(fields = shared.fields().len(), "form created");
		let context = FormContext::new(&shared);
		Ok(Self { shared, context })
	}

	/// The form's context handle; the same handle on every call
	pub fn context(&self) -> FormContext<S> {
		self.context.clone()
	}

	pub fn schema(&self) -> &S {
		&self.shared.schema
	}

	pub fn upstream(&self) -> &Record {
		&self.shared.upstream
	}

	pub fn revision(&self) -> u64 {
		self.shared.revision()
	}

	/// Mark every field touched so all current errors become visible
	pub fn touch_all(&self) {
		self.shared.touch_all();
	}

	/// Restore the touched map to the configured initial state
	pub fn reset_touched(&self) {
		self.shared.reset_touched();
	}

	/// Drop every override; touched state is left alone
	pub fn reset(&self) {
		self.shared.reset();
	}

	pub fn is_form_dirty(&self) -> bool {
		self.shared.is_form_dirty()
	}

	pub fn is_form_valid(&self) -> bool {
		self.shared.is_form_valid()
	}

	/// The full effective record
	pub fn values(&self) -> Record {
		self.shared.values()
	}

	pub fn diff(&self) -> Record {
		self.shared.diff()
	}

	/// Overridden fields, sorted by name
	pub fn dirty_fields(&self) -> Vec<String> {
		self.shared.dirty_fields()
	}

	/// Touched fields, sorted by name
	pub fn touched_fields(&self) -> Vec<String> {
		self.shared.touched_fields()
	}

	/// Every field that currently fails its isolation check
	pub fn errors(&self) -> HashMap<String, ValidationError> {
		self.shared.errors()
	}

	/// Register a listener run after every committed state change
	///
	/// Listeners receive the new revision and run with no internal borrow
	/// held, so they may read or mutate the form.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(u64) + 'static,
	{
		self.shared.subscribe(Rc::new(listener))
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.shared.unsubscribe(id)
	}

	/// Parse the full effective record through the schema
	pub fn submit(&self) -> ValidationResult<S::Output> {
		self.shared.submit()
	}

	/// Validate the full effective record and report through exactly one callback
	///
	/// `on_success` receives the schema's parsed output; `on_failure`
	/// receives every issue. Fields are not touched automatically: call
	/// [`FormEngine::touch_all`] from `on_failure` to reveal errors.
	pub fn handle_submit<F, E>(&self, on_success: F, on_failure: E)
	where
		F: FnOnce(S::Output),
		E: FnOnce(ValidationError),
	{
		match self.submit() {
			Ok(parsed) => on_success(parsed),
			Err(err) => on_failure(err),
		}
	}

	pub fn form_props(&self) -> FormProps {
		FORM_PROPS
	}
}

impl<S> Drop for FormEngine<S> {
	fn drop(&mut self) {
		tracing::debug!("form torn down");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binding::BindOptions;
	use crate::config::InitTouched;
	use diffform_schema::{FieldRule, FieldSchema};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::cell::RefCell;

	#[fixture]
	fn schema() -> FieldSchema {
		FieldSchema::new()
			.field(FieldRule::new("first_name").min_length(1))
			.field(FieldRule::new("email").email())
	}

	#[fixture]
	fn upstream() -> Record {
		[
			("first_name".to_string(), json!("John")),
			("email".to_string(), json!("johndoe@example.com")),
		]
		.into()
	}

	#[rstest]
	fn test_try_new_rejects_empty_schema(upstream: Record) {
		let result = FormEngine::try_new(FieldSchema::new(), upstream, FormConfig::default());
		assert_eq!(result.unwrap_err(), FormError::EmptySchema);
	}

	#[rstest]
	#[should_panic(expected = "the schema declares no fields")]
	fn test_new_panics_on_empty_schema(upstream: Record) {
		FormEngine::new(FieldSchema::new(), upstream, FormConfig::default());
	}

	#[rstest]
	fn test_context_identity_is_stable(schema: FieldSchema, upstream: Record) {
		// Arrange
		let form = FormEngine::new(schema, upstream, FormConfig::default());

		// Act
		let first = form.context();
		form.context().set_touched("email", true);
		let second = form.context();

		// Assert
		assert!(first.ptr_eq(&second));
		assert_eq!(first.revision(), 1);
	}

	#[rstest]
	fn test_no_op_changes_keep_revision(schema: FieldSchema, upstream: Record) {
		// Arrange
		let form = FormEngine::new(schema, upstream, FormConfig::default());
		let ctx = form.context();

		// Act
		ctx.set_touched("email", false);
		ctx.set_diff_value("email", Some(json!("johndoe@example.com")));
		ctx.set_diff_value("email", None);
		form.reset();
		form.reset_touched();

		// Assert
		assert_eq!(form.revision(), 0);
	}

	#[rstest]
	fn test_subscribers_see_each_commit(schema: FieldSchema, upstream: Record) {
		// Arrange
		let form = FormEngine::new(schema, upstream, FormConfig::default());
		let seen = Rc::new(RefCell::new(Vec::new()));
		let id = form.subscribe({
			let seen = seen.clone();
			move |revision| seen.borrow_mut().push(revision)
		});
		let field = form.context().bind("first_name", BindOptions::new());

		// Act
		field.input_props.input("Jane");
		field.input_props.blur();
		assert!(form.unsubscribe(id));
		field.input_props.input("John");

		// Assert
		assert_eq!(*seen.borrow(), vec![1, 2]);
		assert_eq!(form.revision(), 3);
		assert!(!form.unsubscribe(id));
	}

	#[rstest]
	fn test_listener_may_read_and_mutate(schema: FieldSchema, upstream: Record) {
		// Arrange
		let form = FormEngine::new(schema, upstream, FormConfig::default());
		let ctx = form.context();
		form.subscribe({
			let ctx = ctx.clone();
			move |_| {
				if ctx.is_dirty("first_name") {
					ctx.set_touched("first_name", true);
				}
			}
		});

		// Act
		ctx.set_diff_value("first_name", Some(json!("Jane")));

		// Assert
		assert!(ctx.is_touched("first_name"));
		assert_eq!(form.revision(), 2);
	}

	#[rstest]
	fn test_read_helpers(schema: FieldSchema, upstream: Record) {
		// Arrange
		let form = FormEngine::new(schema, upstream, FormConfig::default());
		let ctx = form.context();

		// Act
		ctx.set_diff_value("email", Some(json!("broken")));
		ctx.set_diff_value("first_name", Some(json!("Jane")));
		ctx.set_touched("email", true);

		// Assert
		assert_eq!(form.dirty_fields(), vec!["email", "first_name"]);
		assert_eq!(form.touched_fields(), vec!["email"]);
		assert_eq!(form.values()["email"], json!("broken"));
		assert_eq!(form.diff().len(), 2);
		assert!(!form.is_form_valid());
		let errors = form.errors();
		assert_eq!(errors.len(), 1);
		assert!(errors.contains_key("email"));
	}

	#[rstest]
	fn test_init_touched_per_field(schema: FieldSchema, upstream: Record) {
		// Arrange
		let config = FormConfig::new()
			.init_touched(InitTouched::Fields([("email".to_string(), true)].into()));
		let form = FormEngine::new(schema, upstream, config);

		// Act
		form.touch_all();
		form.reset_touched();

		// Assert
		assert_eq!(form.touched_fields(), vec!["email"]);
	}

	#[rstest]
	fn test_init_touched_covers_fields_outside_schema(schema: FieldSchema, upstream: Record) {
		// Arrange
		let config = FormConfig::new().init_touched(InitTouched::All(true));
		let form = FormEngine::new(schema, upstream, config);
		let ctx = form.context();
		assert!(ctx.is_touched("nickname"));

		// Act
		ctx.set_touched("nickname", false);
		let cleared = ctx.is_touched("nickname");
		form.reset_touched();

		// Assert
		assert!(!cleared);
		assert!(ctx.is_touched("nickname"));
		assert_eq!(form.touched_fields(), vec!["email", "first_name"]);
	}

	#[rstest]
	fn test_form_props(schema: FieldSchema, upstream: Record) {
		let form = FormEngine::new(schema, upstream, FormConfig::default());
		assert!(form.form_props().no_validate);
		assert_eq!(form.form_props().attributes(), vec![("novalidate", String::new())]);
	}
}
