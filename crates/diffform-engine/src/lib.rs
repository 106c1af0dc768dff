//! Diff-against-upstream form state
//!
//! A form is initialized from an upstream record it never mutates. User
//! edits live in a sparse diff holding only the fields that differ from
//! upstream; an edit that makes a field equal to upstream again removes its
//! entry. Validation is delegated to a [`Schema`](diffform_schema::Schema)
//! and error visibility is gated by a per-field touched flag.
//!
//! ## Pieces
//!
//! - [`FormEngine`]: owns the diff and touched state for one form instance
//! - [`FormContext`]: the stable handle field bindings are built against
//! - [`bind`] / [`FieldBinding`]: per-field derived state and the
//!   `on_change` / `on_focus` / `on_blur` handlers
//! - [`config`]: closures and the serde-loadable [`FormPolicy`]
//! - `provider` (feature `provider`, on by default): scoped access to the
//!   current form
//!
//! ## Example
//!
//! ```
//! use diffform_engine::{BindOptions, FormConfig, FormEngine};
//! use diffform_schema::{FieldRule, FieldSchema};
//! use serde_json::json;
//!
//! let schema = FieldSchema::new().field(FieldRule::new("first_name").min_length(1));
//! let upstream = [("first_name".to_string(), json!("John"))].into();
//! let form = FormEngine::new(schema, upstream, FormConfig::default());
//! let ctx = form.context();
//!
//! let field = ctx.bind("first_name", BindOptions::new());
//! field.input_props.input("");
//! field.input_props.blur();
//!
//! let field = ctx.bind("first_name", BindOptions::new());
//! assert!(field.dirty);
//! assert!(field.touched);
//! assert!(field.error_message.is_some());
//!
//! field.input_props.input("John");
//! assert!(!form.is_form_dirty());
//! ```

pub mod binding;
pub mod callback;
pub mod change;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
#[cfg(feature = "provider")]
pub mod provider;
mod state;

pub use binding::{BindOptions, DisabledIfFn, FieldBinding, InputProps, bind, try_bind};
pub use callback::Callback;
pub use change::{ChangeArg, EventTarget, InputEvent, ParseValueFn};
pub use config::{
	EqualityFn, FormConfig, FormPolicy, FormatErrorFn, InitTouched, ShowValidationOn, UntouchOn,
};
pub use context::FormContext;
pub use engine::{FORM_PROPS, FormEngine, FormProps};
pub use error::{FormError, PolicyError};
pub use state::SubscriptionId;
