//! FormEngine integration tests
//!
//! Submission, reset, teardown and dynamic state over a realistic contact
//! form with stub upstream data.

use diffform_engine::{BindOptions, ChangeArg, FormConfig, FormEngine, FormError, InputEvent};
use diffform_schema::{FieldRule, FieldSchema, IssueCode, Record, Typed};
use rstest::*;
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[fixture]
fn contact_schema() -> FieldSchema {
	FieldSchema::new()
		.field(FieldRule::new("firstName").string().min_length(1))
		.field(FieldRule::new("email").email())
}

#[fixture]
fn contact_upstream() -> Record {
	[
		("firstName".to_string(), json!("John")),
		("email".to_string(), json!("johndoe@example.com")),
	]
	.into()
}

// ============================================================================
// Submission
// ============================================================================

/// Test: submit with no edits parses upstream
///
/// Category: Happy Path
#[rstest]
fn test_submit_success(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream.clone(), FormConfig::default());
	let parsed = RefCell::new(None);
	let failures = Cell::new(0);

	// Act
	form.handle_submit(
		|record| *parsed.borrow_mut() = Some(record),
		|_| failures.set(failures.get() + 1),
	);

	// Assert
	assert_eq!(parsed.into_inner(), Some(contact_upstream));
	assert_eq!(failures.get(), 0);
}

/// Test: an invalid override fails submission with an issue for that field
///
/// Category: Error Path
#[rstest]
fn test_submit_failure(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	ctx.bind("email", BindOptions::new())
		.input_props
		.input("not-an-email");
	let successes = Cell::new(0);
	let failure = RefCell::new(None);

	// Act
	form.handle_submit(
		|_| successes.set(successes.get() + 1),
		|err| *failure.borrow_mut() = Some(err),
	);

	// Assert
	assert_eq!(successes.get(), 0);
	let failure = failure.into_inner().unwrap();
	assert_eq!(failure.issues.len(), 1);
	assert_eq!(failure.issues[0].field(), Some("email"));
	assert_eq!(failure.issues[0].code, IssueCode::InvalidEmail);
}

/// Test: submission does not touch fields; touch_all from the failure
/// callback reveals every error
///
/// Category: Behavior
#[rstest]
fn test_touch_all_from_failure_reveals_errors(
	contact_schema: FieldSchema,
	contact_upstream: Record,
) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	ctx.set_diff_value("email", Some(json!("broken")));
	ctx.set_diff_value("firstName", Some(json!("")));

	// Act
	form.handle_submit(|_| unreachable!("submission must fail"), |_| {
		assert!(form.touched_fields().is_empty());
		form.touch_all();
	});

	// Assert
	for field in ["email", "firstName"] {
		let binding = ctx.bind(field, BindOptions::new());
		assert!(binding.touched);
		assert!(binding.error_message.is_some(), "{field} should show its error");
	}
}

/// Test: context-level submission follows the engine's contract
///
/// Category: Happy Path
#[rstest]
fn test_context_handle_submit(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	ctx.set_diff_value("firstName", Some(json!("Jane")));
	let first_name = RefCell::new(Value::Null);

	// Act
	ctx.handle_submit(
		|record| *first_name.borrow_mut() = record["firstName"].clone(),
		|err| panic!("unexpected failure: {err}"),
	);

	// Assert
	assert_eq!(first_name.into_inner(), json!("Jane"));
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Contact {
	first_name: String,
	email: String,
}

/// Test: a typed schema hands on_success the caller's type
///
/// Category: Happy Path
#[rstest]
fn test_typed_submit(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(
		Typed::<_, Contact>::new(contact_schema),
		contact_upstream,
		FormConfig::default(),
	);
	let contact = RefCell::new(None);

	// Act
	form.handle_submit(|parsed| *contact.borrow_mut() = Some(parsed), |err| {
		panic!("unexpected failure: {err}")
	});

	// Assert
	assert_eq!(
		contact.into_inner(),
		Some(Contact {
			first_name: "John".to_string(),
			email: "johndoe@example.com".to_string(),
		})
	);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Membership {
	name: String,
	seats: u32,
}

/// Test: text typed into a number field reaches an integer target
///
/// Category: Regression
#[rstest]
fn test_typed_submit_with_integer_from_text() {
	// Arrange
	let schema = FieldSchema::new()
		.field(FieldRule::new("name").min_length(1))
		.field(FieldRule::new("seats").number());
	let upstream = [
		("name".to_string(), json!("Team")),
		("seats".to_string(), json!(5)),
	]
	.into();
	let form = FormEngine::new(
		Typed::<_, Membership>::new(schema),
		upstream,
		FormConfig::default(),
	);
	form.context()
		.bind("seats", BindOptions::new())
		.input_props
		.input("30");
	let membership = RefCell::new(None);

	// Act
	form.handle_submit(|parsed| *membership.borrow_mut() = Some(parsed), |err| {
		panic!("unexpected failure: {err}")
	});

	// Assert
	assert_eq!(
		membership.into_inner(),
		Some(Membership {
			name: "Team".to_string(),
			seats: 30,
		})
	);
}

// ============================================================================
// Reset
// ============================================================================

/// Test: reset twice equals reset once
///
/// Category: Property
#[rstest]
fn test_reset_idempotence(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream.clone(), FormConfig::default());
	let ctx = form.context();
	ctx.set_diff_value("firstName", Some(json!("Jane")));
	ctx.set_diff_value("email", Some(json!("jane@example.com")));
	ctx.set_touched("email", true);

	// Act
	form.reset();
	let after_first = (form.diff(), form.touched_fields(), form.revision());
	form.reset();

	// Assert
	assert_eq!((form.diff(), form.touched_fields(), form.revision()), after_first);
	assert!(!form.is_form_dirty());
	for (field, upstream) in &contact_upstream {
		assert_eq!(&ctx.value(field), upstream);
	}
	assert_eq!(form.touched_fields(), vec!["email"]);
}

// ============================================================================
// Dynamic state
// ============================================================================

#[fixture]
fn account_form() -> FormEngine<FieldSchema> {
	let schema = FieldSchema::new()
		.field(FieldRule::new("role").one_of([json!("admin"), json!("member")]))
		.field(FieldRule::new("email").email())
		.field(FieldRule::new("permissions").array());
	let upstream = [
		("role".to_string(), json!("member")),
		("email".to_string(), json!("member@example.com")),
		("permissions".to_string(), json!(["Read", "Write"])),
	]
	.into();
	FormEngine::new(schema, upstream, FormConfig::default())
}

/// Test: disabled_if is evaluated against the full effective record
///
/// Category: Behavior
#[rstest]
#[case(false)]
#[case(true)]
fn test_dynamic_disable(account_form: FormEngine<FieldSchema>, #[case] static_disabled: bool) {
	// Arrange
	let ctx = account_form.context();
	let options = || {
		BindOptions::new()
			.disabled(static_disabled)
			.disabled_if(|record| record.get("role") == Some(&json!("admin")))
	};
	assert_eq!(ctx.bind("email", options()).input_props.disabled, static_disabled);

	// Act
	ctx.bind("role", BindOptions::new()).input_props.input("admin");

	// Assert
	assert!(ctx.bind("email", options()).input_props.disabled);
}

/// Test: reordering a collection is not a change under a set equality
///
/// Category: Behavior
#[rstest]
fn test_collection_equality_override(account_form: FormEngine<FieldSchema>) {
	// Arrange
	let ctx = account_form.context();
	let options = || {
		BindOptions::new()
			.parse_value(diffform_engine::change::parse::selected())
			.is_equal(|a, b| sorted_join(a) == sorted_join(b))
	};
	let permissions = ctx.bind("permissions", options());

	// Act
	permissions
		.input_props
		.change([ChangeArg::Event(InputEvent::multi_select(["Write", "Read"]))]);

	// Assert
	let permissions = ctx.bind("permissions", options());
	assert!(!permissions.dirty);
	assert!(!account_form.diff().contains_key("permissions"));
	assert_eq!(permissions.value, json!(["Read", "Write"]));
}

/// Test: without an override, reordering is a change
///
/// Category: Behavior
#[rstest]
fn test_collection_default_equality_is_ordered(account_form: FormEngine<FieldSchema>) {
	// Arrange
	let ctx = account_form.context();
	let options = || BindOptions::new().parse_value(diffform_engine::change::parse::selected());

	// Act
	ctx.bind("permissions", options())
		.input_props
		.change([ChangeArg::Event(InputEvent::multi_select(["Write", "Read"]))]);

	// Assert
	assert!(ctx.bind("permissions", options()).dirty);
}

/// Test: bind-time equality takes precedence over form-level equality
///
/// Category: Behavior
#[rstest]
fn test_equality_precedence() {
	// Arrange
	let schema = FieldSchema::new().field(FieldRule::new("tags").array());
	let upstream = [("tags".to_string(), json!(["a", "b"]))].into();
	let config = FormConfig::new().is_equal("tags", |a, b| sorted_join(a) == sorted_join(b));
	let form = FormEngine::new(schema, upstream, config);
	let ctx = form.context();

	// Act
	ctx.set_diff_value("tags", Some(json!(["b", "a"])));
	let form_level_dirty = ctx.is_dirty("tags");
	ctx.bind("tags", BindOptions::new().is_equal(|a, b| a == b))
		.input_props
		.change_value(json!(["b", "a"]));

	// Assert
	assert!(!form_level_dirty);
	assert!(ctx.is_dirty("tags"));
}

fn sorted_join(value: &Value) -> String {
	let mut items: Vec<String> = value
		.as_array()
		.map(|items| items.iter().map(ToString::to_string).collect())
		.unwrap_or_default();
	items.sort();
	items.join(",")
}

// ============================================================================
// Teardown
// ============================================================================

/// Test: binding against a torn-down form is a usage error
///
/// Category: Error Path
#[rstest]
#[should_panic(expected = "the form context has been released")]
fn test_bind_after_teardown_panics(contact_schema: FieldSchema, contact_upstream: Record) {
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	drop(form);

	ctx.bind("email", BindOptions::new());
}

/// Test: try_bind surfaces teardown as an error value
///
/// Category: Error Path
#[rstest]
fn test_try_bind_after_teardown(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	let handlers = ctx.bind("email", BindOptions::new()).input_props;

	// Act
	drop(form);
	handlers.input("late@example.com");
	handlers.blur();

	// Assert
	assert!(!ctx.is_live());
	assert_eq!(
		ctx.try_bind("email", BindOptions::new()).unwrap_err(),
		FormError::ContextReleased
	);
}

/// Test: subscribers observe handler-driven changes
///
/// Category: Behavior
#[rstest]
fn test_subscription_drives_rerender(contact_schema: FieldSchema, contact_upstream: Record) {
	// Arrange
	let form = FormEngine::new(contact_schema, contact_upstream, FormConfig::default());
	let ctx = form.context();
	let renders = Rc::new(RefCell::new(Vec::new()));
	form.subscribe({
		let ctx = ctx.clone();
		let renders = renders.clone();
		move |_| {
			let email = ctx.bind("email", BindOptions::new());
			renders.borrow_mut().push(email.error_message);
		}
	});
	let email = ctx.bind("email", BindOptions::new());

	// Act
	email.input_props.input("broken");
	email.input_props.blur();

	// Assert
	assert_eq!(
		*renders.borrow(),
		vec![None, Some("Enter a valid email address".to_string())]
	);
}
