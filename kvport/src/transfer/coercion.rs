//! Native type inference for string-encoded hash fields.
//!
//! Key-value engines hand every hash field back as a string, whatever it held
//! logically. Before a hash is written to the destination each string field is
//! reinterpreted:
//!
//! | input                        | result            |
//! |------------------------------|-------------------|
//! | `"true"` / `"false"`         | `Value::Bool`     |
//! | optional `-`, then digits    | `Value::I64`      |
//! | anything else                | unchanged string  |
//!
//! The rule is schema-less and applies to every field: a username that happens
//! to be `"true"` becomes a boolean too.

use crate::common::{HashFields, Value};

/// Infers the native scalar type of a string field value.
pub fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if is_integer_literal(raw) => match raw.parse::<i64>() {
            Ok(number) => Value::I64(number),
            Err(_) => {
                // out of i64 range
                log::debug!("Integer literal '{}' does not fit in i64, kept as string", raw);
                Value::String(raw.to_string())
            }
        },
        _ => Value::String(raw.to_string()),
    }
}

/// Coerces string values; other variants pass through untouched.
pub fn coerce_value(value: Value) -> Value {
    match value {
        Value::String(raw) => coerce_scalar(&raw),
        other => other,
    }
}

/// Coerces every field of a hash, keeping field order.
pub fn coerce_fields(fields: HashFields) -> HashFields {
    fields
        .into_iter()
        .map(|(name, value)| (name, coerce_value(value)))
        .collect()
}

/// `-?[0-9]+`, nothing else.
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields, val};

    #[test]
    fn test_booleans() {
        assert_eq!(coerce_scalar("true"), Value::Bool(true));
        assert_eq!(coerce_scalar("false"), Value::Bool(false));
    }

    #[test]
    fn test_boolean_match_is_exact() {
        assert_eq!(coerce_scalar("True"), val!("True"));
        assert_eq!(coerce_scalar("FALSE"), val!("FALSE"));
        assert_eq!(coerce_scalar(" true"), val!(" true"));
    }

    #[test]
    fn test_integers() {
        assert_eq!(coerce_scalar("42"), Value::I64(42));
        assert_eq!(coerce_scalar("-17"), Value::I64(-17));
        assert_eq!(coerce_scalar("0"), Value::I64(0));
        assert_eq!(coerce_scalar("-0"), Value::I64(0));
        assert_eq!(coerce_scalar("007"), Value::I64(7));
    }

    #[test]
    fn test_non_integers_stay_strings() {
        assert_eq!(coerce_scalar("hello"), val!("hello"));
        assert_eq!(coerce_scalar("1.5"), val!("1.5"));
        assert_eq!(coerce_scalar("+5"), val!("+5"));
        assert_eq!(coerce_scalar("-"), val!("-"));
        assert_eq!(coerce_scalar(""), val!(""));
        assert_eq!(coerce_scalar("12a"), val!("12a"));
        assert_eq!(coerce_scalar("--1"), val!("--1"));
        assert_eq!(coerce_scalar(" 1"), val!(" 1"));
    }

    #[test]
    fn test_non_ascii_digits_stay_strings() {
        assert_eq!(coerce_scalar("٣"), val!("٣"));
    }

    #[test]
    fn test_i64_bounds() {
        assert_eq!(coerce_scalar("9223372036854775807"), Value::I64(i64::MAX));
        assert_eq!(coerce_scalar("-9223372036854775808"), Value::I64(i64::MIN));
    }

    #[test]
    fn test_overflow_stays_string() {
        assert_eq!(
            coerce_scalar("9223372036854775808"),
            val!("9223372036854775808")
        );
    }

    #[test]
    fn test_structured_values_pass_through() {
        assert_eq!(coerce_value(Value::I64(5)), Value::I64(5));
        assert_eq!(coerce_value(Value::Bool(false)), Value::Bool(false));
        assert_eq!(coerce_value(Value::F64(1.5)), Value::F64(1.5));
        assert_eq!(coerce_value(Value::Null), Value::Null);
    }

    #[test]
    fn test_coerce_fields_applies_to_every_field() {
        let fields = fields! { "age": "30", "admin": "true", "name": "hello", "score": 9 };
        let coerced = coerce_fields(fields);
        assert_eq!(coerced, fields! { "age": 30, "admin": true, "name": "hello", "score": 9 });
    }

    #[test]
    fn test_coerce_fields_keeps_order() {
        let coerced = coerce_fields(fields! { "z": "1", "a": "2" });
        let names: Vec<&str> = coerced.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_string_lookalikes_are_coerced() {
        // no schema to tell a username apart from a flag
        let coerced = coerce_fields(fields! { "username": "true" });
        assert_eq!(coerced.get("username"), Some(&Value::Bool(true)));
    }
}
