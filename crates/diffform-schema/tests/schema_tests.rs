//! Schema contract integration tests
//!
//! Exercises the reference schema through the `Schema` trait the way the form
//! engine consumes it: full-record parsing, isolated field checks and the
//! optional-field query.

use diffform_schema::validators::PatternValidator;
use diffform_schema::{
	FieldRule, FieldSchema, Issue, IssueCode, Record, Schema, Typed, ValidationError,
	default_format_error_message,
};
use rstest::*;
use serde::Deserialize;
use serde_json::{Value, json};

#[fixture]
fn signup_schema() -> FieldSchema {
	FieldSchema::new()
		.field(FieldRule::new("username").trim().min_length(3).max_length(16).pattern(
			PatternValidator::new("[a-z0-9_]+")
				.unwrap()
				.with_message("Use lowercase letters, digits and underscores"),
		))
		.field(FieldRule::new("email").email())
		.field(FieldRule::new("homepage").url().optional())
		.field(FieldRule::new("password").min_length(8))
		.field(FieldRule::new("confirm"))
		.field(
			FieldRule::new("plan")
				.one_of([json!("free"), json!("pro")])
				.default_value(json!("free")),
		)
		.check(|record| {
			if record.get("password") == record.get("confirm") {
				Ok(())
			} else {
				Err(Issue::new(
					"confirm",
					IssueCode::Custom("mismatch".to_string()),
					"Passwords do not match",
				))
			}
		})
}

fn signup(pairs: &[(&str, Value)]) -> Record {
	pairs
		.iter()
		.map(|(field, value)| (field.to_string(), value.clone()))
		.collect()
}

/// Test: a complete valid record parses with coercions applied
///
/// Category: Happy Path
#[rstest]
fn test_parse_valid_signup(signup_schema: FieldSchema) {
	// Arrange
	let record = signup(&[
		("username", json!(" jdoe_42 ")),
		("email", json!("jdoe@example.com")),
		("password", json!("hunter2hunter2")),
		("confirm", json!("hunter2hunter2")),
	]);

	// Act
	let parsed = signup_schema.parse(&record).unwrap();

	// Assert
	assert_eq!(parsed["username"], json!("jdoe_42"));
	assert_eq!(parsed["plan"], json!("free"));
	assert_eq!(parsed["homepage"], Value::Null);
}

/// Test: record-level checks run only once every field is clean
///
/// Category: Error Path
#[rstest]
#[case::field_errors_first(json!("short"), vec![IssueCode::TooShort])]
#[case::mismatch(json!("different-secret"), vec![IssueCode::Custom("mismatch".to_string())])]
fn test_record_checks_follow_field_checks(
	signup_schema: FieldSchema,
	#[case] password: Value,
	#[case] expected: Vec<IssueCode>,
) {
	// Arrange
	let record = signup(&[
		("username", json!("jdoe")),
		("email", json!("jdoe@example.com")),
		("password", password),
		("confirm", json!("hunter2hunter2")),
	]);

	// Act
	let err = signup_schema.parse(&record).unwrap_err();

	// Assert
	let codes: Vec<IssueCode> = err.issues.into_iter().map(|issue| issue.code).collect();
	assert_eq!(codes, expected);
}

/// Test: isolated field checks see only the field's own value
///
/// Category: Behavior
#[rstest]
#[case("username", json!("Bad Name"), Some(IssueCode::PatternMismatch))]
#[case("username", json!("  ab "), Some(IssueCode::TooShort))]
#[case("homepage", json!(""), None)]
#[case("homepage", json!("ftp://example.com"), Some(IssueCode::InvalidUrl))]
#[case("plan", json!("enterprise"), Some(IssueCode::InvalidChoice))]
#[case("confirm", json!("anything"), None)]
#[case("unknown", json!({"kept": true}), None)]
fn test_parse_field_in_isolation(
	signup_schema: FieldSchema,
	#[case] field: &str,
	#[case] value: Value,
	#[case] expected: Option<IssueCode>,
) {
	// Act
	let result = signup_schema.parse_field(field, &value);

	// Assert
	assert_eq!(
		result.err().map(|err| err.issues[0].code.clone()),
		expected
	);
}

/// Test: optional fields and unknown names are reported optional
///
/// Category: Behavior
#[rstest]
fn test_is_optional(signup_schema: FieldSchema) {
	assert!(!signup_schema.is_optional("username"));
	assert!(signup_schema.is_optional("homepage"));
	assert!(signup_schema.is_optional("unknown"));
	assert_eq!(
		signup_schema.field_names(),
		vec!["username", "email", "homepage", "password", "confirm", "plan"]
	);
}

/// Test: structured errors flatten per field and format with the default
///
/// Category: Behavior
#[rstest]
fn test_error_reporting(signup_schema: FieldSchema) {
	// Arrange
	let record = signup(&[("email", json!("nope")), ("password", json!("x"))]);

	// Act
	let err: ValidationError = signup_schema.parse(&record).unwrap_err();

	// Assert
	let by_field = err.field_errors();
	assert_eq!(by_field["email"], vec!["Enter a valid email address"]);
	assert_eq!(by_field["username"], vec!["This field is required."]);
	let email_issues: Vec<Issue> = err.for_field("email").into_iter().cloned().collect();
	assert_eq!(
		default_format_error_message(&email_issues, "email"),
		"Enter a valid email address"
	);
	assert_eq!(default_format_error_message(&[], "email"), "Invalid value");
}

#[derive(Debug, Deserialize)]
struct Signup {
	username: String,
	plan: Plan,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Plan {
	Free,
	Pro,
}

/// Test: the typed adapter deserializes the cleaned record
///
/// Category: Happy Path
#[rstest]
fn test_typed_output(signup_schema: FieldSchema) {
	// Arrange
	let schema = Typed::<_, Signup>::new(signup_schema);
	let record = signup(&[
		("username", json!("jdoe")),
		("email", json!("jdoe@example.com")),
		("password", json!("hunter2hunter2")),
		("confirm", json!("hunter2hunter2")),
		("plan", json!("pro")),
	]);

	// Act
	let parsed = schema.parse(&record).unwrap();

	// Assert
	assert_eq!(parsed.username, "jdoe");
	assert_eq!(parsed.plan, Plan::Pro);
}

/// Test: a record that fits the schema but not the type fails as a whole
///
/// Category: Error Path
#[rstest]
fn test_typed_shape_mismatch() {
	// Arrange
	let schema = Typed::<_, Signup>::new(
		FieldSchema::new()
			.field(FieldRule::new("username"))
			.field(FieldRule::new("plan")),
	);
	let record = signup(&[("username", json!("jdoe")), ("plan", json!("gold"))]);

	// Act
	let err = schema.parse(&record).unwrap_err();

	// Assert
	assert_eq!(err.issues.len(), 1);
	assert_eq!(err.issues[0].code, IssueCode::InvalidType);
	assert_eq!(err.issues[0].field(), None);
}
