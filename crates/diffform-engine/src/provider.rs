//! Scoped form provider
//!
//! Convenience layer for component trees that would rather not thread a
//! [`FormContext`] through every call. [`provide_form`] makes a context
//! current for the duration of a closure; [`use_field`] binds against the
//! innermost provided form of the requested schema type.
//!
//! Nothing else in the engine depends on this module.
//!
//! ```
//! use diffform_engine::provider::{provide_form, use_field};
//! use diffform_engine::{BindOptions, FormConfig, FormEngine};
//! use diffform_schema::{FieldRule, FieldSchema};
//!
//! let schema = FieldSchema::new().field(FieldRule::new("email").email());
//! let form = FormEngine::new(schema, Default::default(), FormConfig::default());
//!
//! let required = provide_form(&form.context(), || {
//!     use_field::<FieldSchema>("email", BindOptions::new()).input_props.required
//! });
//! assert!(required);
//! ```

use crate::binding::{self, BindOptions, FieldBinding};
use crate::context::FormContext;
use crate::error::FormError;
use diffform_schema::Schema;
use std::any::Any;
use std::cell::RefCell;

thread_local! {
	static PROVIDED_FORMS: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Pops the provided context even if the scoped closure panics
struct ProvideGuard;

impl Drop for ProvideGuard {
	fn drop(&mut self) {
		PROVIDED_FORMS.with(|forms| {
			forms.borrow_mut().pop();
		});
	}
}

/// Run `f` with `ctx` as the current form
///
/// Calls nest; the innermost provided form of a given schema type wins.
pub fn provide_form<S, R, F>(ctx: &FormContext<S>, f: F) -> R
where
	S: 'static,
	F: FnOnce() -> R,
{
	PROVIDED_FORMS.with(|forms| {
		forms.borrow_mut().push(Box::new(ctx.clone()));
	});
	let _guard = ProvideGuard;
	f()
}

/// The innermost provided form whose schema type is `S`
pub fn current_form<S: 'static>() -> Option<FormContext<S>> {
	PROVIDED_FORMS.with(|forms| {
		forms
			.borrow()
			.iter()
			.rev()
			.find_map(|form| form.downcast_ref::<FormContext<S>>())
			.cloned()
	})
}

/// Bind `name` against the current form
///
/// # Panics
///
/// Panics with [`FormError::NoContext`] outside any [`provide_form`] scope for
/// `S`, and with [`FormError::ContextReleased`] if that form was torn down.
pub fn use_field<S: Schema + 'static>(name: &str, options: BindOptions) -> FieldBinding {
	try_use_field::<S>(name, options).unwrap_or_else(|err| panic!("{err}"))
}

pub fn try_use_field<S: Schema + 'static>(
	name: &str,
	options: BindOptions,
) -> Result<FieldBinding, FormError> {
	let ctx = current_form::<S>().ok_or(FormError::NoContext)?;
	binding::try_bind(&ctx, name, options)
}
