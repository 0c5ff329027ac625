use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::errors::record;
use crate::errors::ValidationErrors;
use crate::errors::BODY_FIELD;
use crate::rules::Constraint;
use crate::rules::FieldKind;
use crate::rules::FieldRule;
use crate::rules::INVALID_TYPE;
use crate::rules::INVALID_VALUE;
use crate::rules::REQUIRED;

/// An input type that declares its field table.
///
/// The table is the single source of truth for field names, expected JSON
/// kinds and constraints; nothing is discovered at runtime.
pub trait InputShape: DeserializeOwned {
    const RULES: &'static [FieldRule];
}

/// Bind a raw JSON body into `T`, or describe every offending field.
///
/// # Arguments
/// * `raw` - Request body bytes; an empty body is treated as `{}`
///
/// # Returns
/// The typed value when the body satisfies `T::RULES` and deserializes
///
/// # Errors
/// * `ValidationErrors` - Field-keyed messages, never empty
pub fn bind<T: InputShape>(raw: &[u8]) -> Result<T, ValidationErrors> {
    let body = parse_body(raw)?;

    if let Some(errors) = check_fields(&body, T::RULES) {
        return Err(errors);
    }

    serde_json::from_value(Value::Object(body)).map_err(|e| {
        tracing::debug!(error = %e, "Body passed field rules but failed typed binding");
        required_fallback(T::RULES)
    })
}

/// Run the field rules against a raw body without producing a typed value.
///
/// # Returns
/// `None` when the body is acceptable, otherwise the offending fields
pub fn validate_input(raw: &[u8], rules: &[FieldRule]) -> Option<ValidationErrors> {
    match parse_body(raw) {
        Ok(body) => check_fields(&body, rules),
        Err(errors) => Some(errors),
    }
}

fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, ValidationErrors> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(_) => Err(ValidationErrors::single(BODY_FIELD, INVALID_TYPE)),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not valid JSON");
            Err(ValidationErrors::single(BODY_FIELD, INVALID_TYPE))
        }
    }
}

/// Missing, null and empty-string values count as absent.
fn present<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match body.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value),
    }
}

/// Evaluate the rule table in phases; the first phase that finds anything wins.
fn check_fields(body: &Map<String, Value>, rules: &[FieldRule]) -> Option<ValidationErrors> {
    let mut errors = BTreeMap::new();

    for rule in rules {
        if let Some(value) = body.get(rule.name) {
            if !value.is_null() && !rule.kind.accepts(value) {
                record(&mut errors, rule.name, INVALID_TYPE.to_string());
            }
        }
    }
    if !errors.is_empty() {
        return ValidationErrors::from_collected(errors);
    }

    let layout_violated = rules.iter().any(|rule| match rule.kind {
        FieldKind::Timestamp(layout) => present(body, rule.name)
            .and_then(Value::as_str)
            .is_some_and(|s| layout.parse(s).is_none()),
        _ => false,
    });
    if layout_violated {
        for rule in rules {
            if let FieldKind::Timestamp(layout) = rule.kind {
                record(&mut errors, rule.name, layout.message());
            }
        }
        return ValidationErrors::from_collected(errors);
    }

    for rule in rules {
        let value = present(body, rule.name);
        for constraint in rule.constraints {
            let failure = match (constraint, value) {
                (Constraint::Required, None) => Some(REQUIRED.to_string()),
                (_, None) => None,
                (constraint, Some(value)) => constraint.check(value),
            };
            if let Some(message) = failure {
                record(&mut errors, rule.name, message);
                break;
            }
        }
    }

    ValidationErrors::from_collected(errors)
}

/// Last resort when the typed bind fails for a reason the rules did not catch.
fn required_fallback(rules: &[FieldRule]) -> ValidationErrors {
    let mut errors = BTreeMap::new();
    for rule in rules.iter().filter(|rule| rule.is_required()) {
        record(&mut errors, rule.name, REQUIRED.to_string());
    }

    ValidationErrors::from_collected(errors)
        .unwrap_or_else(|| ValidationErrors::single(BODY_FIELD, INVALID_VALUE))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::rules::DateLayout;

    const LAYOUT: DateLayout = DateLayout::new("%Y-%m-%d %H:%M", "YYYY-MM-DD HH:MM");

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NewExpense {
        category: String,
        amount: f64,
        description: String,
        transaction_at: String,
    }

    impl InputShape for NewExpense {
        const RULES: &'static [FieldRule] = &[
            FieldRule::text(
                "category",
                &[Constraint::Required, Constraint::OneOf(&["FOOD", "HEALTH"])],
            ),
            FieldRule::number("amount", &[Constraint::Required, Constraint::Positive]),
            FieldRule::text(
                "description",
                &[Constraint::Required, Constraint::MaxLength(20)],
            ),
            FieldRule::timestamp(
                "transactionAt",
                LAYOUT,
                &[Constraint::Required, Constraint::DateFormat(LAYOUT)],
            ),
        ];
    }

    #[derive(Debug, Deserialize)]
    struct Unruled {
        #[allow(dead_code)]
        id: u32,
    }

    impl InputShape for Unruled {
        const RULES: &'static [FieldRule] = &[FieldRule::number("id", &[])];
    }

    #[test]
    fn test_valid_body_binds() {
        let expense = bind::<NewExpense>(
            br#"{"category":"FOOD","amount":12.5,"description":"lunch","transactionAt":"2024-03-05 12:00"}"#,
        )
        .expect("expected a valid bind");

        assert_eq!(expense.category, "FOOD");
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.description, "lunch");
        assert_eq!(expense.transaction_at, "2024-03-05 12:00");
    }

    #[test]
    fn test_validate_input_passes_valid_body() {
        let result = validate_input(
            br#"{"category":"HEALTH","amount":3,"description":"x","transactionAt":"2024-03-05 12:00"}"#,
            NewExpense::RULES,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_and_out_of_range_reported_together() {
        let errors = bind::<NewExpense>(
            br#"{"category":"FOOD","amount":-4,"transactionAt":"2024-03-05 12:00"}"#,
        )
        .expect_err("expected validation errors");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("amount"), Some("Must be greater than 0"));
        assert_eq!(errors.get("description"), Some("This field is required"));
    }

    #[test]
    fn test_empty_string_and_null_count_as_missing() {
        let errors = bind::<NewExpense>(
            br#"{"category":"","amount":null,"description":"ok","transactionAt":"2024-03-05 12:00"}"#,
        )
        .expect_err("expected validation errors");

        assert_eq!(errors.get("category"), Some("This field is required"));
        assert_eq!(errors.get("amount"), Some("This field is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_first_failing_constraint_wins() {
        let errors = bind::<NewExpense>(
            br#"{"category":"PETS","amount":1,"description":"this description is far too long","transactionAt":"2024-03-05 12:00"}"#,
        )
        .expect_err("expected validation errors");

        assert_eq!(errors.get("category"), Some("Invalid value"));
        assert_eq!(errors.get("description"), Some("Value is too long"));
    }

    #[test]
    fn test_wrong_type_reported_before_constraints() {
        let errors = bind::<NewExpense>(
            br#"{"category":"FOOD","amount":"ten","transactionAt":"2024-03-05 12:00"}"#,
        )
        .expect_err("expected validation errors");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("amount"), Some("Invalid type"));
    }

    #[test]
    fn test_bad_date_layout_flags_timestamp_fields() {
        let errors = bind::<NewExpense>(
            br#"{"category":"FOOD","amount":1,"description":"x","transactionAt":"05/03/2024"}"#,
        )
        .expect_err("expected validation errors");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("transactionAt"),
            Some("Invalid datetime format. Expected: YYYY-MM-DD HH:MM")
        );
    }

    #[test]
    fn test_unpadded_or_signed_dates_rejected() {
        for raw in [
            &br#"{"category":"FOOD","amount":1,"description":"x","transactionAt":"2024-3-5 9:5"}"#[..],
            &br#"{"category":"FOOD","amount":1,"description":"x","transactionAt":"+262142-12-31 23:59"}"#[..],
            &br#"{"category":"FOOD","amount":1,"description":"x","transactionAt":"02024-03-05 12:00"}"#[..],
        ] {
            let errors = bind::<NewExpense>(raw).expect_err("expected validation errors");
            assert_eq!(
                errors.get("transactionAt"),
                Some("Invalid datetime format. Expected: YYYY-MM-DD HH:MM")
            );
        }
    }

    #[test]
    fn test_non_object_body_is_invalid_type() {
        for raw in [&b"[1,2]"[..], &b"\"text\""[..], &b"{not json"[..]] {
            let errors = validate_input(raw, NewExpense::RULES).expect("expected errors");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get(BODY_FIELD), Some("Invalid type"));
        }
    }

    #[test]
    fn test_empty_body_reports_required_fields() {
        let errors = bind::<NewExpense>(b"").expect_err("expected validation errors");

        assert_eq!(errors.len(), 4);
        for field in ["category", "amount", "description", "transactionAt"] {
            assert_eq!(errors.get(field), Some("This field is required"));
        }
    }

    #[test]
    fn test_typed_failure_falls_back_to_body_marker() {
        let errors = bind::<Unruled>(br#"{"id":-1}"#).expect_err("expected validation errors");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(BODY_FIELD), Some("Invalid value"));
    }

    #[test]
    fn test_typed_failure_flags_required_fields() {
        let fallback = required_fallback(NewExpense::RULES);
        assert_eq!(fallback.len(), 4);
        assert_eq!(fallback.get("amount"), Some("This field is required"));
    }
}
