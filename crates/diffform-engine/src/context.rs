//! The capability handle field bindings are built against

use crate::binding::{self, BindOptions, FieldBinding};
use crate::config::{ShowValidationOn, UntouchOn};
use crate::error::FormError;
use crate::state::Shared;
use diffform_schema::{Record, Schema, ValidationError};
use serde_json::Value;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle to a form's state, produced by [`FormEngine::context`]
///
/// The engine hands out the same handle for its whole lifetime, so hosts can
/// use identity ([`FormContext::ptr_eq`]) plus [`FormContext::revision`] to
/// skip redundant re-derivation. The handle does not keep the form alive:
/// once the engine is dropped, reads and bindings through it are usage
/// errors.
///
/// [`FormEngine::context`]: crate::FormEngine::context
pub struct FormContext<S> {
	shared: Weak<Shared<S>>,
}

impl<S> Clone for FormContext<S> {
	fn clone(&self) -> Self {
		Self {
			shared: Weak::clone(&self.shared),
		}
	}
}

impl<S> fmt::Debug for FormContext<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormContext")
			.field("live", &(self.shared.strong_count() > 0))
			.finish()
	}
}

impl<S> FormContext<S> {
	pub(crate) fn new(shared: &Rc<Shared<S>>) -> Self {
		Self {
			shared: Rc::downgrade(shared),
		}
	}

	pub(crate) fn upgrade(&self) -> Option<Rc<Shared<S>>> {
		self.shared.upgrade()
	}

	pub(crate) fn try_live(&self) -> Result<Rc<Shared<S>>, FormError> {
		self.upgrade().ok_or(FormError::ContextReleased)
	}

	fn live(&self) -> Rc<Shared<S>> {
		self.try_live().unwrap_or_else(|err| panic!("{err}"))
	}

	/// Whether the form behind this handle still exists
	pub fn is_live(&self) -> bool {
		self.shared.strong_count() > 0
	}

	/// Whether both handles refer to the same form
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Weak::ptr_eq(&self.shared, &other.shared)
	}

	/// Counter bumped on every committed state change
	pub fn revision(&self) -> u64 {
		self.live().revision()
	}

	pub fn set_touched(&self, field: &str, touched: bool) {
		self.live().set_touched(field, touched);
	}
}

impl<S: Schema + 'static> FormContext<S> {
	/// The field's effective value: its diff entry if present, else upstream
	pub fn value(&self, field: &str) -> Value {
		self.live().effective_value(field)
	}

	pub fn upstream_value(&self, field: &str) -> Value {
		self.live().upstream_value(field)
	}

	/// The full effective record
	pub fn values(&self) -> Record {
		self.live().values()
	}

	pub fn is_dirty(&self, field: &str) -> bool {
		self.live().is_dirty(field)
	}

	pub fn is_touched(&self, field: &str) -> bool {
		self.live().is_touched(field)
	}

	/// The field's current validation failure, regardless of visibility
	pub fn error(&self, field: &str) -> Option<ValidationError> {
		self.live().field_error(field)
	}

	pub fn is_valid(&self, field: &str) -> bool {
		self.error(field).is_none()
	}

	pub fn is_required(&self, field: &str) -> bool {
		!self.live().schema.is_optional(field)
	}

	/// Format `err` with the form's message formatter
	pub fn format_error(&self, field: &str, err: &ValidationError) -> String {
		self.live().format_error(field, err)
	}

	/// Override the field's value, or clear the override with `None`
	///
	/// Values equal to upstream (per the form-level equality for this field)
	/// are pruned instead of stored.
	pub fn set_diff_value(&self, field: &str, value: Option<Value>) {
		let shared = self.live();
		let equals_upstream = value.as_ref().is_some_and(|value| {
			shared.values_equal(field, value, &shared.upstream_value(field), None)
		});
		shared.set_diff_entry(field, value, equals_upstream, false);
	}

	pub fn default_show_validation_on(&self) -> ShowValidationOn {
		self.live().config.default_show_validation_on()
	}

	pub fn default_untouch_on(&self) -> UntouchOn {
		self.live().config.default_untouch_on()
	}

	/// Bind a field; see [`binding::bind`]
	pub fn bind(&self, name: &str, options: BindOptions) -> FieldBinding {
		binding::bind(self, name, options)
	}

	pub fn try_bind(&self, name: &str, options: BindOptions) -> Result<FieldBinding, FormError> {
		binding::try_bind(self, name, options)
	}

	/// Same contract as [`FormEngine::handle_submit`](crate::FormEngine::handle_submit)
	pub fn handle_submit<F, E>(&self, on_success: F, on_failure: E)
	where
		F: FnOnce(S::Output),
		E: FnOnce(ValidationError),
	{
		let result = self.live().submit();
		match result {
			Ok(parsed) => on_success(parsed),
			Err(err) => on_failure(err),
		}
	}
}
