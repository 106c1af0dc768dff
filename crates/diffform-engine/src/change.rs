//! Change-event shapes and value parsers
//!
//! A field's `on_change` handler receives whatever its call site passes: a
//! native control event, or a value some custom widget already extracted.
//! A [`ParseValueFn`] turns those arguments into the field's value.

use serde_json::Value;
use std::rc::Rc;

/// Converts change-handler arguments into a field value
pub type ParseValueFn = Rc<dyn Fn(&[ChangeArg]) -> Value>;

/// The element an input event originated from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTarget {
	pub value: String,
	pub checked: bool,
	/// Values of the selected options of a multi-select
	pub selected: Vec<String>,
}

/// A native change/input event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputEvent {
	pub target: EventTarget,
}

impl InputEvent {
	/// Event from a text-like control
	pub fn text(value: impl Into<String>) -> Self {
		Self {
			target: EventTarget {
				value: value.into(),
				..EventTarget::default()
			},
		}
	}

	/// Event from a checkbox
	pub fn checkbox(checked: bool) -> Self {
		Self {
			target: EventTarget {
				value: (if checked { "on" } else { "" }).to_string(),
				checked,
				..EventTarget::default()
			},
		}
	}

	/// Event from a multi-select
	pub fn multi_select<I, T>(selected: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		let selected: Vec<String> = selected.into_iter().map(Into::into).collect();
		Self {
			target: EventTarget {
				value: selected.first().cloned().unwrap_or_default(),
				selected,
				..EventTarget::default()
			},
		}
	}
}

/// One argument passed to a change handler
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeArg {
	Event(InputEvent),
	Value(Value),
}

impl From<InputEvent> for ChangeArg {
	fn from(event: InputEvent) -> Self {
		Self::Event(event)
	}
}

impl From<Value> for ChangeArg {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

/// Stock parsers for common controls
pub mod parse {
	use super::{ChangeArg, ParseValueFn};
	use serde_json::Value;
	use std::rc::Rc;

	/// Default parser: `target.value` of a single event as a string.
	/// A single plain value passes through; anything else yields `Null`.
	///
	/// # Examples
	///
	/// ```
	/// use diffform_engine::change::{parse, ChangeArg, InputEvent};
	/// use serde_json::json;
	///
	/// let parser = parse::target_value();
	/// assert_eq!(parser(&[ChangeArg::Event(InputEvent::text("John"))]), json!("John"));
	/// assert_eq!(parser(&[ChangeArg::Value(json!(3))]), json!(3));
	/// assert_eq!(parser(&[]), json!(null));
	/// ```
	pub fn target_value() -> ParseValueFn {
		Rc::new(|args: &[ChangeArg]| match args {
			[ChangeArg::Event(event)] => Value::String(event.target.value.clone()),
			[ChangeArg::Value(value)] => value.clone(),
			_ => Value::Null,
		})
	}

	/// Checkbox parser: `target.checked` as a boolean
	pub fn checked() -> ParseValueFn {
		Rc::new(|args: &[ChangeArg]| match args {
			[ChangeArg::Event(event), ..] => Value::Bool(event.target.checked),
			[ChangeArg::Value(Value::Bool(flag)), ..] => Value::Bool(*flag),
			_ => Value::Null,
		})
	}

	/// Multi-select parser: the selected option values as an array
	pub fn selected() -> ParseValueFn {
		Rc::new(|args: &[ChangeArg]| match args {
			[ChangeArg::Event(event), ..] => Value::Array(
				event
					.target
					.selected
					.iter()
					.cloned()
					.map(Value::String)
					.collect(),
			),
			[ChangeArg::Value(value @ Value::Array(_)), ..] => value.clone(),
			_ => Value::Null,
		})
	}

	/// Numeric parser: `target.value` as a number; blank input yields `Null`
	/// and non-numeric text is kept as a string so the schema can reject it
	pub fn number() -> ParseValueFn {
		Rc::new(|args: &[ChangeArg]| {
			let text = match args {
				[ChangeArg::Event(event), ..] => event.target.value.trim().to_string(),
				[ChangeArg::Value(value @ Value::Number(_)), ..] => return value.clone(),
				[ChangeArg::Value(Value::String(s)), ..] => s.trim().to_string(),
				_ => return Value::Null,
			};
			if text.is_empty() {
				return Value::Null;
			}
			if let Ok(int) = text.parse::<i64>() {
				return Value::from(int);
			}
			text.parse::<f64>()
				.ok()
				.and_then(serde_json::Number::from_f64)
				.map(Value::Number)
				.unwrap_or(Value::String(text))
		})
	}

	/// Value parser for custom widgets: the first plain value, else `Null`
	pub fn value() -> ParseValueFn {
		Rc::new(|args: &[ChangeArg]| {
			args.iter()
				.find_map(|arg| match arg {
					ChangeArg::Value(value) => Some(value.clone()),
					ChangeArg::Event(_) => None,
				})
				.unwrap_or(Value::Null)
		})
	}
}
