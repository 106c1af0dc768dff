//! # diffform
//!
//! Form state that records only what the user changed.
//!
//! A form starts from an upstream record it never mutates. Edits go into a
//! sparse diff, an edit back to the upstream value removes its entry, and
//! validation is delegated to a pluggable [`Schema`]. Each field's error
//! message stays hidden until the field is touched, so users are not shown
//! errors for inputs they have not reached yet.
//!
//! ## Crates
//!
//! - [`schema`] (`diffform-schema`): the validator contract plus a
//!   declarative reference schema
//! - [`engine`] (`diffform-engine`): the form engine, field bindings and
//!   configuration
//!
//! ## Feature Flags
//!
//! - `provider` (default): `provide_form` / `use_field` scoped access to the
//!   current form
//!
//! ## Quick Example
//!
//! ```
//! use diffform::prelude::*;
//! use serde_json::json;
//!
//! let schema = FieldSchema::new()
//!     .field(FieldRule::new("first_name").min_length(1))
//!     .field(FieldRule::new("email").email());
//! let upstream = [
//!     ("first_name".to_string(), json!("John")),
//!     ("email".to_string(), json!("johndoe@example.com")),
//! ].into();
//! let form = FormEngine::new(schema, upstream, FormConfig::default());
//!
//! let email = form.context().bind("email", BindOptions::new());
//! email.input_props.input("jane@example.com");
//!
//! form.handle_submit(
//!     |record| assert_eq!(record["email"], json!("jane@example.com")),
//!     |err| panic!("{err}"),
//! );
//! ```

pub use diffform_engine as engine;
pub use diffform_schema as schema;

pub use diffform_engine::{
	BindOptions, Callback, ChangeArg, EventTarget, FieldBinding, FormConfig, FormContext,
	FormEngine, FormError, FormPolicy, FormProps, InitTouched, InputEvent, InputProps,
	PolicyError, ShowValidationOn, SubscriptionId, UntouchOn, bind, try_bind,
};
pub use diffform_engine::change::parse;
pub use diffform_schema::{
	FieldRule, FieldSchema, Issue, IssueCode, Record, Schema, Typed, ValidationError,
	ValidationResult, default_format_error_message,
};

#[cfg(feature = "provider")]
pub use diffform_engine::provider::{current_form, provide_form, try_use_field, use_field};

/// Re-exports for building forms
pub mod prelude {
	pub use crate::{
		BindOptions, ChangeArg, FieldBinding, FieldRule, FieldSchema, FormConfig, FormContext,
		FormEngine, InputEvent, Record, Schema, ShowValidationOn, Typed, UntouchOn,
		ValidationError, parse,
	};

	#[cfg(feature = "provider")]
	pub use crate::{provide_form, use_field};
}
