//! Typed output adapter

use crate::issue::{Issue, IssueCode, ValidationError, ValidationResult};
use crate::schema::{Record, Schema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Deserializes the record produced by an inner schema into `T`
///
/// Field-level behavior is delegated unchanged. A record that passes the
/// inner schema but does not fit `T` fails with one record-level
/// [`IssueCode::InvalidType`] issue.
///
/// # Examples
///
/// ```
/// use diffform_schema::{FieldRule, FieldSchema, Schema, Typed};
/// use serde::Deserialize;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// #[derive(Deserialize)]
/// struct Contact {
///     email: String,
/// }
///
/// let schema = Typed::<_, Contact>::new(FieldSchema::new().field(FieldRule::new("email").email()));
/// let record: HashMap<_, _> = [("email".to_string(), json!("a@b.io"))].into();
/// let contact = schema.parse(&record).unwrap();
/// assert_eq!(contact.email, "a@b.io");
/// ```
pub struct Typed<S, T> {
	inner: S,
	_output: PhantomData<fn() -> T>,
}

impl<S, T> Typed<S, T> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			_output: PhantomData,
		}
	}

	pub fn inner(&self) -> &S {
		&self.inner
	}
}

impl<S: Clone, T> Clone for Typed<S, T> {
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<S: fmt::Debug, T> fmt::Debug for Typed<S, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Typed")
			.field("inner", &self.inner)
			.field("output", &std::any::type_name::<T>())
			.finish()
	}
}

impl<S, T> Schema for Typed<S, T>
where
	S: Schema<Output = Record>,
	T: DeserializeOwned,
{
	type Output = T;

	fn field_names(&self) -> Vec<String> {
		self.inner.field_names()
	}

	fn parse(&self, record: &Record) -> ValidationResult<T> {
		let cleaned = self.inner.parse(record)?;
		let object: serde_json::Map<String, Value> = cleaned.into_iter().collect();
		serde_json::from_value(Value::Object(object)).map_err(|err| {
			ValidationError::single(Issue::record(IssueCode::InvalidType, err.to_string()))
		})
	}

	fn parse_field(&self, name: &str, value: &Value) -> ValidationResult<Value> {
		self.inner.parse_field(name, value)
	}

	fn is_optional(&self, name: &str) -> bool {
		self.inner.is_optional(name)
	}
}
