//! Declarative input validation.
//!
//! Validation is driven by a rule table: each entry names a field and the checks it must
//! pass. Every field is evaluated (no early exit across fields) and all failures are
//! collected into [`ValidationErrors`], keyed by field in table order.
//!
//! Inputs are JSON values so that type mismatches from JSON bodies (a number where a string is
//! expected, an object where an array is expected) are reported rather than coerced. Strings
//! are compared after trimming surrounding whitespace.
//!
//! ```
//! use contactd::validation::{validate, FieldRules, Rule};
//! use serde_json::json;
//!
//! const RULES: &[FieldRules] = &[FieldRules::new("email", &[Rule::Required, Rule::Email])];
//!
//! let input = json!({ "email": "not-an-email" });
//! let errors = validate(RULES, input.as_object().unwrap()).unwrap_err();
//! assert_eq!(errors.get("email").unwrap(), ["The email field must be a valid email address."]);
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A single predicate applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null, and not an empty/whitespace string or empty array. When this fails
    /// the field's remaining rules are skipped.
    Required,
    /// Must be a JSON string
    String,
    /// String length (in characters) or array length must not exceed the bound
    Max(usize),
    /// Must be a syntactically valid email address
    Email,
    /// Must be an array
    Array,
}

/// The rules for one field
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }

    fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

/// Rule table for contact form submissions
pub const CONTACT_RULES: &[FieldRules] = &[
    FieldRules::new("name", &[Rule::Required, Rule::String, Rule::Max(255)]),
    FieldRules::new("email", &[Rule::Required, Rule::Email]),
    FieldRules::new("phone", &[Rule::Required, Rule::String]),
    FieldRules::new("message", &[Rule::Required, Rule::String]),
    FieldRules::new("street", &[Rule::Required, Rule::String]),
    FieldRules::new("state", &[Rule::Required, Rule::String]),
    FieldRules::new("zip", &[Rule::Required, Rule::String]),
    FieldRules::new("country", &[Rule::Required, Rule::String]),
    FieldRules::new("images", &[Rule::Array]),
    FieldRules::new("files", &[Rule::Array]),
];

/// Aggregated validation failures, ordered by field
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    errors: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.errors.iter_mut().find(|(f, _)| f == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.errors.push((field.to_string(), vec![message.into()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of failure messages across all fields
    pub fn len(&self) -> usize {
        self.errors.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Names of the failing fields, in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(f, _)| f.as_str())
    }

    /// One-line summary: the first message, plus a count of the rest
    pub fn summary(&self) -> String {
        let Some(first) = self.errors.first().and_then(|(_, messages)| messages.first()) else {
            return "The given data was invalid.".to_string();
        };
        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, messages) in &self.errors {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Evaluate a rule table against an input object
pub fn validate(table: &[FieldRules], input: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field_rules in table {
        validate_field(field_rules, input.get(field_rules.field), &mut errors);
    }
    errors.into_result()
}

fn validate_field(field_rules: &FieldRules, value: Option<&Value>, errors: &mut ValidationErrors) {
    let field = field_rules.field;

    if is_blank(value) {
        if field_rules.is_required() {
            errors.add(field, format!("The {field} field is required."));
        }
        return;
    }
    let Some(value) = value else { return };

    for rule in field_rules.rules {
        if let Some(message) = check(*rule, field, value) {
            errors.add(field, message);
        }
    }
}

/// Apply one rule to a present value, returning the failure message if it does not pass
fn check(rule: Rule, field: &str, value: &Value) -> Option<String> {
    match rule {
        Rule::Required => None,
        Rule::String => (!value.is_string()).then(|| format!("The {field} field must be a string.")),
        Rule::Max(max) => match value {
            Value::String(s) if s.trim().chars().count() > max => {
                Some(format!("The {field} field must not be greater than {max} characters."))
            }
            Value::Array(items) if items.len() > max => Some(format!("The {field} field must not have more than {max} items.")),
            _ => None,
        },
        Rule::Email => {
            let valid = value.as_str().is_some_and(|s| is_valid_email(s.trim()));
            (!valid).then(|| format!("The {field} field must be a valid email address."))
        }
        Rule::Array => (!value.is_array()).then(|| format!("The {field} field must be an array.")),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// RFC 5322 addr-spec check (local part, `@`, domain)
pub fn is_valid_email(candidate: &str) -> bool {
    lettre::Address::from_str(candidate).is_ok()
}

/// Read a validated string field, trimmed
pub fn trimmed(input: &Map<String, Value>, field: &str) -> String {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> Value {
        json!({
            "name": "A",
            "email": "a@example.com",
            "phone": "555",
            "message": "hi",
            "street": "1 Rd",
            "state": "CA",
            "zip": "90000",
            "country": "US"
        })
    }

    fn run(input: &Value) -> Result<(), ValidationErrors> {
        validate(CONTACT_RULES, input.as_object().unwrap())
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(run(&valid_input()).is_ok());
    }

    #[test]
    fn test_each_missing_required_field_is_reported() {
        for field in ["name", "email", "phone", "message", "street", "state", "zip", "country"] {
            let mut input = valid_input();
            input.as_object_mut().unwrap().remove(field);

            let errors = run(&input).unwrap_err();
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec![field]);
            assert_eq!(errors.get(field).unwrap(), [format!("The {field} field is required.")]);
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut input = valid_input();
        input["phone"] = json!("   ");
        input["zip"] = json!(null);

        let errors = run(&input).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["phone", "zip"]);
    }

    #[test]
    fn test_all_failures_are_aggregated() {
        let errors = run(&json!({ "email": "nope" })).unwrap_err();

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["name", "email", "phone", "message", "street", "state", "zip", "country"]
        );
        assert_eq!(errors.len(), 8);
        assert_eq!(errors.summary(), "The name field is required. (and 7 more errors)");
    }

    #[test]
    fn test_invalid_email() {
        for email in ["not-an-email", "a@", "@example.com", "a b@example.com"] {
            let mut input = valid_input();
            input["email"] = json!(email);

            let errors = run(&input).unwrap_err();
            assert_eq!(
                errors.get("email").unwrap(),
                ["The email field must be a valid email address."],
                "{email} should be rejected"
            );
            assert_eq!(errors.summary(), "The email field must be a valid email address.");
        }
    }

    #[test]
    fn test_email_must_be_a_string() {
        let mut input = valid_input();
        input["email"] = json!(42);
        let errors = run(&input).unwrap_err();
        assert_eq!(errors.get("email").unwrap(), ["The email field must be a valid email address."]);
    }

    #[test]
    fn test_name_length_counts_characters() {
        let mut input = valid_input();
        input["name"] = json!("é".repeat(255));
        assert!(run(&input).is_ok());

        input["name"] = json!("a".repeat(256));
        let errors = run(&input).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name field must not be greater than 255 characters."]
        );
    }

    #[test]
    fn test_non_string_scalar_is_rejected() {
        let mut input = valid_input();
        input["zip"] = json!(90000);

        let errors = run(&input).unwrap_err();
        assert_eq!(errors.get("zip").unwrap(), ["The zip field must be a string."]);
    }

    #[test]
    fn test_attachment_slots_must_be_arrays_when_present() {
        let mut input = valid_input();
        input["images"] = json!("cat.png");
        input["files"] = json!([]);

        let errors = run(&input).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["images"]);
        assert_eq!(errors.get("images").unwrap(), ["The images field must be an array."]);
    }

    #[test]
    fn test_serializes_as_ordered_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "first");
        errors.add("name", "second");
        errors.add("email", "third");

        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"email":["first","third"],"name":["second"]}"#
        );
        assert_eq!(errors.summary(), "first (and 2 more errors)");
    }

    #[test]
    fn test_trimmed_reads_strings() {
        let input = json!({ "name": "  A  ", "zip": 5 });
        let input = input.as_object().unwrap();
        assert_eq!(trimmed(input, "name"), "A");
        assert_eq!(trimmed(input, "zip"), "");
        assert_eq!(trimmed(input, "missing"), "");
    }
}
