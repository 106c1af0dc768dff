//! Validator contract for diffform
//!
//! The form engine treats validation as a black box. This crate defines the
//! box's interface and ships one implementation of it:
//!
//! - [`Schema`]: full-record `parse`, single-field `parse_field`, and the
//!   "is this field optional" query
//! - [`ValidationError`] / [`Issue`]: structured failures carrying every
//!   issue, each tagged with the path of the field it concerns
//! - [`FieldSchema`]: a declarative reference schema built from [`FieldRule`]s
//! - [`Typed`]: adapter that deserializes a parsed record into a caller type
//!
//! ## Example
//!
//! ```
//! use diffform_schema::{FieldRule, FieldSchema, Schema};
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! let schema = FieldSchema::new()
//!     .field(FieldRule::new("first_name").min_length(1))
//!     .field(FieldRule::new("email").email());
//!
//! let mut record = HashMap::new();
//! record.insert("first_name".to_string(), json!("John"));
//! record.insert("email".to_string(), json!("not-an-email"));
//!
//! let err = schema.parse(&record).unwrap_err();
//! assert_eq!(err.issues.len(), 1);
//! assert_eq!(err.issues[0].field(), Some("email"));
//! ```

pub mod field_schema;
pub mod issue;
pub mod schema;
pub mod typed;
pub mod validators;

pub use field_schema::{CustomCheck, FieldRule, FieldSchema};
pub use issue::{
	DEFAULT_ERROR_MESSAGE, Issue, IssueCode, ValidationError, ValidationResult,
	default_format_error_message,
};
pub use schema::{Record, Schema};
pub use typed::Typed;
