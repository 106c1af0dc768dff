//! Shared form state and its transition rules
//!
//! Everything observable is derived on read from four inputs: the schema,
//! the upstream record, the sparse diff and the touched map. Only the diff
//! and the touched map ever change, and every change goes through
//! [`Shared::commit`], which bumps the revision and notifies subscribers
//! once no borrow is held.

use crate::config::{EqualityFn, FormConfig};
use crate::error::FormError;
use diffform_schema::{Record, Schema, ValidationError, ValidationResult};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) type Listener = Rc<dyn Fn(u64)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct FormState {
	diff: Record,
	touched: HashMap<String, bool>,
	revision: u64,
}

pub(crate) struct Shared<S> {
	pub(crate) schema: S,
	pub(crate) upstream: Record,
	pub(crate) config: FormConfig,
	fields: Vec<String>,
	initial_touched: HashMap<String, bool>,
	state: RefCell<FormState>,
	listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
	next_subscription: Cell<u64>,
}

impl<S: Schema> Shared<S> {
	pub(crate) fn new(schema: S, upstream: Record, config: FormConfig) -> Result<Self, FormError> {
		let fields = schema.field_names();
		if fields.is_empty() {
			return Err(FormError::EmptySchema);
		}
		let initial_touched: HashMap<String, bool> = fields
			.iter()
			.map(|field| (field.clone(), config.initial_touched().is_touched(field)))
			.collect();
		Ok(Self {
			schema,
			upstream,
			config,
			state: RefCell::new(FormState {
				diff: Record::new(),
				touched: initial_touched.clone(),
				revision: 0,
			}),
			fields,
			initial_touched,
			listeners: RefCell::new(Vec::new()),
			next_subscription: Cell::new(0),
		})
	}

	pub(crate) fn upstream_value(&self, field: &str) -> Value {
		self.upstream.get(field).cloned().unwrap_or(Value::Null)
	}

	pub(crate) fn effective_value(&self, field: &str) -> Value {
		let state = self.state.borrow();
		state
			.diff
			.get(field)
			.or_else(|| self.upstream.get(field))
			.cloned()
			.unwrap_or(Value::Null)
	}

	/// Upstream overlaid with the diff; schema fields missing from both read as `Null`
	pub(crate) fn values(&self) -> Record {
		let state = self.state.borrow();
		let mut record = self.upstream.clone();
		for field in &self.fields {
			record.entry(field.clone()).or_insert(Value::Null);
		}
		for (field, value) in &state.diff {
			record.insert(field.clone(), value.clone());
		}
		record
	}

	pub(crate) fn diff(&self) -> Record {
		self.state.borrow().diff.clone()
	}

	pub(crate) fn is_dirty(&self, field: &str) -> bool {
		self.state.borrow().diff.contains_key(field)
	}

	pub(crate) fn is_form_dirty(&self) -> bool {
		!self.state.borrow().diff.is_empty()
	}

	pub(crate) fn dirty_fields(&self) -> Vec<String> {
		let state = self.state.borrow();
		let mut fields: Vec<String> = state.diff.keys().cloned().collect();
		fields.sort();
		fields
	}

	pub(crate) fn is_touched(&self, field: &str) -> bool {
		let explicit = self.state.borrow().touched.get(field).copied();
		explicit.unwrap_or_else(|| self.default_touched(field))
	}

	pub(crate) fn touched_fields(&self) -> Vec<String> {
		let state = self.state.borrow();
		let mut fields: Vec<String> = state
			.touched
			.iter()
			.filter(|(_, touched)| **touched)
			.map(|(field, _)| field.clone())
			.collect();
		fields.sort();
		fields
	}

	pub(crate) fn field_error(&self, field: &str) -> Option<ValidationError> {
		let value = self.effective_value(field);
		self.schema.parse_field(field, &value).err()
	}

	pub(crate) fn errors(&self) -> HashMap<String, ValidationError> {
		self.fields
			.iter()
			.filter_map(|field| self.field_error(field).map(|err| (field.clone(), err)))
			.collect()
	}

	pub(crate) fn is_form_valid(&self) -> bool {
		self.fields.iter().all(|field| self.field_error(field).is_none())
	}

	pub(crate) fn format_error(&self, field: &str, err: &ValidationError) -> String {
		self.config.format(&err.issues, field)
	}

	/// Precedence: bind-time equality, then form-level, then `==`
	pub(crate) fn values_equal(
		&self,
		field: &str,
		a: &Value,
		b: &Value,
		bind_equality: Option<&EqualityFn>,
	) -> bool {
		match bind_equality
			.cloned()
			.or_else(|| self.config.equality_for(field))
		{
			Some(is_equal) => is_equal(a, b),
			None => a == b,
		}
	}

	pub(crate) fn submit(&self) -> ValidationResult<S::Output> {
		let record = self.values();
		let result = self.schema.parse(&record);
		match &result {
			Ok(_) => tracing::debug!(fields = record.len(), "form submission parsed"),
			Err(err) => tracing::debug!(
				issues = err.issues.len(),
				"form submission failed validation"
			),
		}
		result
	}
}

impl<S> Shared<S> {
	pub(crate) fn fields(&self) -> &[String] {
		&self.fields
	}

	pub(crate) fn revision(&self) -> u64 {
		self.state.borrow().revision
	}

	/// Apply a mutation; `f` reports whether anything changed
	fn commit<F>(&self, f: F) -> bool
	where
		F: FnOnce(&mut FormState) -> bool,
	{
		let revision = {
			let mut state = self.state.borrow_mut();
			if !f(&mut state) {
				return false;
			}
			state.revision += 1;
			state.revision
		};
		let listeners: Vec<Listener> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in listeners {
			listener(revision);
		}
		true
	}

	pub(crate) fn subscribe(&self, listener: Listener) -> SubscriptionId {
		let id = SubscriptionId(self.next_subscription.get());
		self.next_subscription.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, listener));
		id
	}

	pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(existing, _)| *existing != id);
		listeners.len() != before
	}

	/// Store `value` as the override for `field`, or drop the override when
	/// `value` is `None` or `equals_upstream` holds
	pub(crate) fn set_diff_entry(
		&self,
		field: &str,
		value: Option<Value>,
		equals_upstream: bool,
		untouch: bool,
	) -> bool {
		self.commit(|state| {
			let mut changed = match value {
				Some(value) if !equals_upstream => {
					if state.diff.get(field) == Some(&value) {
						false
					} else {
						tracing::debug!(field, "diff entry set");
						state.diff.insert(field.to_string(), value);
						true
					}
				}
				_ => {
					let removed = state.diff.remove(field).is_some();
					if removed {
						tracing::debug!(field, "diff entry pruned");
					}
					removed
				}
			};
			if untouch {
				changed |= set_touched_flag(state, field, false, self.default_touched(field));
			}
			changed
		})
	}

	/// Configured initial flag; fields outside the schema fall back to it too
	fn default_touched(&self, field: &str) -> bool {
		self.config.initial_touched().is_touched(field)
	}

	pub(crate) fn set_touched(&self, field: &str, touched: bool) -> bool {
		let default = self.default_touched(field);
		self.commit(|state| set_touched_flag(state, field, touched, default))
	}

	pub(crate) fn touch_all(&self) -> bool {
		self.commit(|state| {
			let mut changed = false;
			for field in &self.fields {
				changed |= set_touched_flag(state, field, true, self.default_touched(field));
			}
			let extra: Vec<String> = state.touched.keys().cloned().collect();
			for field in extra {
				changed |= set_touched_flag(state, &field, true, self.default_touched(&field));
			}
			if changed {
				tracing::debug!("all fields touched");
			}
			changed
		})
	}

	pub(crate) fn reset_touched(&self) -> bool {
		self.commit(|state| {
			if state.touched == self.initial_touched {
				return false;
			}
			tracing::debug!("touched state restored to initial configuration");
			state.touched = self.initial_touched.clone();
			true
		})
	}

	pub(crate) fn reset(&self) -> bool {
		self.commit(|state| {
			if state.diff.is_empty() {
				return false;
			}
			tracing::debug!(entries = state.diff.len(), "diff cleared");
			state.diff.clear();
			true
		})
	}
}

fn set_touched_flag(state: &mut FormState, field: &str, touched: bool, default: bool) -> bool {
	let current = state.touched.get(field).copied().unwrap_or(default);
	if current == touched {
		return false;
	}
	tracing::debug!(field, touched, "touched flag changed");
	state.touched.insert(field.to_string(), touched);
	true
}
