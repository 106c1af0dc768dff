//! Validator contract and record type

use crate::issue::ValidationResult;
use serde_json::Value;
use std::collections::HashMap;

/// A record keyed by field name
pub type Record = HashMap<String, Value>;

/// The validator contract consumed by the form engine
///
/// Implementations own the field set and the rules. The engine only ever asks
/// four questions: which fields exist, does a full record parse, does one
/// field's value parse in isolation, and is a field optional.
pub trait Schema {
	/// What a successful full-record parse produces. Coercions and defaults
	/// applied by the schema show up here, not in the raw record.
	type Output;

	/// Declared field names, in declaration order
	fn field_names(&self) -> Vec<String>;

	fn parse(&self, record: &Record) -> ValidationResult<Self::Output>;

	/// Check a single field's value without looking at any other field
	fn parse_field(&self, name: &str, value: &Value) -> ValidationResult<Value>;

	fn is_optional(&self, name: &str) -> bool;
}

impl<S: Schema + ?Sized> Schema for Box<S> {
	type Output = S::Output;

	fn field_names(&self) -> Vec<String> {
		(**self).field_names()
	}

	fn parse(&self, record: &Record) -> ValidationResult<Self::Output> {
		(**self).parse(record)
	}

	fn parse_field(&self, name: &str, value: &Value) -> ValidationResult<Value> {
		(**self).parse_field(name, value)
	}

	fn is_optional(&self, name: &str) -> bool {
		(**self).is_optional(name)
	}
}
