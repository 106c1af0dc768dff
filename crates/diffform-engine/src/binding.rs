//! Per-field bindings
//!
//! [`bind`] derives one field's state from a [`FormContext`] and produces the
//! event handlers that feed user interaction back into the form. A binding is
//! a snapshot: after any change, bind again to read the new state. The
//! handlers themselves stay valid across changes because they act on the
//! form, not on the snapshot.

use crate::callback::Callback;
use crate::change::{ChangeArg, InputEvent, ParseValueFn, parse};
use crate::config::{EqualityFn, ShowValidationOn, UntouchOn};
use crate::context::FormContext;
use crate::error::FormError;
use diffform_schema::{Record, Schema, ValidationError};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Predicate over the full effective record deciding whether a field is disabled
pub type DisabledIfFn = Rc<dyn Fn(&Record) -> bool>;

/// Per-field options; every setting is optional
#[derive(Clone, Default)]
pub struct BindOptions {
	disabled: bool,
	disabled_if: Option<DisabledIfFn>,
	show_validation_on: Option<ShowValidationOn>,
	untouch_on: Option<UntouchOn>,
	parse_value: Option<ParseValueFn>,
	is_equal: Option<EqualityFn>,
}

impl fmt::Debug for BindOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BindOptions")
			.field("disabled", &self.disabled)
			.field("disabled_if", &self.disabled_if.is_some())
			.field("show_validation_on", &self.show_validation_on)
			.field("untouch_on", &self.untouch_on)
			.field("parse_value", &self.parse_value.is_some())
			.field("is_equal", &self.is_equal.is_some())
			.finish()
	}
}

impl BindOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Static disable; wins over [`BindOptions::disabled_if`]
	pub fn disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}

	/// Disable the field whenever `predicate` holds for the full effective record
	pub fn disabled_if<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&Record) -> bool + 'static,
	{
		self.disabled_if = Some(Rc::new(predicate));
		self
	}

	pub fn show_validation_on(mut self, show: ShowValidationOn) -> Self {
		self.show_validation_on = Some(show);
		self
	}

	pub fn untouch_on(mut self, untouch: UntouchOn) -> Self {
		self.untouch_on = Some(untouch);
		self
	}

	/// Replace the default `target.value` extraction
	///
	/// See [`parse`](crate::change::parse) for stock parsers.
	pub fn parse_value(mut self, parse_value: ParseValueFn) -> Self {
		self.parse_value = Some(parse_value);
		self
	}

	/// Equality against upstream for this binding
	///
	/// Needed for composite values such as unordered collections, where the
	/// structural default treats reordered but equivalent values as changed.
	pub fn is_equal<F>(mut self, is_equal: F) -> Self
	where
		F: Fn(&Value, &Value) -> bool + 'static,
	{
		self.is_equal = Some(Rc::new(is_equal));
		self
	}
}

/// Props to spread onto the bound control
#[derive(Debug, Clone)]
pub struct InputProps {
	pub name: String,
	pub value: Value,
	pub disabled: bool,
	pub required: bool,
	pub data_valid: bool,
	pub on_change: Callback<Vec<ChangeArg>>,
	pub on_focus: Callback,
	pub on_blur: Callback,
}

impl InputProps {
	/// Invoke `on_change` with arbitrary call-site arguments
	pub fn change<I>(&self, args: I)
	where
		I: IntoIterator<Item = ChangeArg>,
	{
		self.on_change.call(args.into_iter().collect());
	}

	/// Invoke `on_change` as a text control would
	pub fn input(&self, text: impl Into<String>) {
		self.on_change.call(vec![ChangeArg::Event(InputEvent::text(text))]);
	}

	/// Invoke `on_change` with an already-extracted value
	pub fn change_value(&self, value: Value) {
		self.on_change.call(vec![ChangeArg::Value(value)]);
	}

	pub fn focus(&self) {
		self.on_focus.call(());
	}

	pub fn blur(&self) {
		self.on_blur.call(());
	}

	/// Static attributes as `(name, value)` pairs; boolean attributes appear
	/// only when set
	pub fn attributes(&self) -> Vec<(&'static str, String)> {
		let mut attributes = vec![
			("name", self.name.clone()),
			("value", attribute_value(&self.value)),
		];
		if self.disabled {
			attributes.push(("disabled", String::new()));
		}
		if self.required {
			attributes.push(("required", String::new()));
		}
		attributes.push(("data-valid", self.data_valid.to_string()));
		attributes
	}
}

fn attribute_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Derived state of one field
#[derive(Debug, Clone)]
pub struct FieldBinding {
	pub name: String,
	pub input_props: InputProps,
	pub upstream_value: Value,
	/// Effective value: the diff entry if present, else upstream
	pub value: Value,
	pub disabled: bool,
	pub touched: bool,
	pub dirty: bool,
	pub valid: bool,
	/// The field's validation failure, regardless of visibility
	pub error: Option<ValidationError>,
	/// The formatted message, present only when the error is visible
	pub error_message: Option<String>,
	pub show_validation: ShowValidationOn,
	pub untouch_on: UntouchOn,
}

/// Bind `name` against `ctx`
///
/// # Panics
///
/// Panics when the form behind `ctx` has been torn down; see [`try_bind`].
pub fn bind<S: Schema + 'static>(ctx: &FormContext<S>, name: &str, options: BindOptions) -> FieldBinding {
	try_bind(ctx, name, options).unwrap_or_else(|err| panic!("{err}"))
}

pub fn try_bind<S: Schema + 'static>(
	ctx: &FormContext<S>,
	name: &str,
	options: BindOptions,
) -> Result<FieldBinding, FormError> {
	let shared = ctx.try_live()?;

	let upstream_value = shared.upstream_value(name);
	let value = shared.effective_value(name);
	let touched = shared.is_touched(name);
	let dirty = shared.is_dirty(name);
	let error = shared.field_error(name);
	let valid = error.is_none();
	let required = !shared.schema.is_optional(name);

	let show_validation = options
		.show_validation_on
		.unwrap_or_else(|| shared.config.default_show_validation_on());
	let untouch_on = options
		.untouch_on
		.unwrap_or_else(|| shared.config.default_untouch_on());

	let disabled = options.disabled
		|| options
			.disabled_if
			.as_ref()
			.is_some_and(|predicate| predicate(&shared.values()));

	let error_message = match &error {
		Some(_) if show_validation == ShowValidationOn::Touched && !touched => None,
		Some(err) => Some(shared.format_error(name, err)),
		None => None,
	};
	drop(shared);

	let input_props = InputProps {
		name: name.to_string(),
		value: value.clone(),
		disabled,
		required,
		data_valid: valid,
		on_change: change_handler(ctx, name, &options, untouch_on),
		on_focus: focus_handler(ctx, name, untouch_on),
		on_blur: blur_handler(ctx, name),
	};

	Ok(FieldBinding {
		name: name.to_string(),
		input_props,
		upstream_value,
		value,
		disabled,
		touched,
		dirty,
		valid,
		error,
		error_message,
		show_validation,
		untouch_on,
	})
}

fn change_handler<S: Schema + 'static>(
	ctx: &FormContext<S>,
	name: &str,
	options: &BindOptions,
	untouch_on: UntouchOn,
) -> Callback<Vec<ChangeArg>> {
	let ctx = ctx.clone();
	let field = name.to_string();
	let parse_value = options
		.parse_value
		.clone()
		.unwrap_or_else(parse::target_value);
	let is_equal = options.is_equal.clone();

	Callback::new(move |args: Vec<ChangeArg>| {
		let Some(shared) = ctx.upgrade() else {
			tracing::warn!(field = %field, "change handler invoked after form teardown");
			return;
		};
		let value = parse_value(args.as_slice());
		let upstream = shared.upstream_value(&field);
		let equals_upstream = shared.values_equal(&field, &value, &upstream, is_equal.as_ref());
		shared.set_diff_entry(
			&field,
			Some(value),
			equals_upstream,
			untouch_on == UntouchOn::Change,
		);
	})
}

fn focus_handler<S: 'static>(ctx: &FormContext<S>, name: &str, untouch_on: UntouchOn) -> Callback {
	let ctx = ctx.clone();
	let field = name.to_string();

	Callback::new(move |()| {
		let Some(shared) = ctx.upgrade() else {
			tracing::warn!(field = %field, "focus handler invoked after form teardown");
			return;
		};
		if untouch_on == UntouchOn::Focus {
			shared.set_touched(&field, false);
		}
	})
}

fn blur_handler<S: 'static>(ctx: &FormContext<S>, name: &str) -> Callback {
	let ctx = ctx.clone();
	let field = name.to_string();

	Callback::new(move |()| {
		let Some(shared) = ctx.upgrade() else {
			tracing::warn!(field = %field, "blur handler invoked after form teardown");
			return;
		};
		shared.set_touched(&field, true);
	})
}
