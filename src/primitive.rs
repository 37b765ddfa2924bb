//! Primitive descriptors: number, string, boolean, literal, any.
//!
//! `number`, `string`, `boolean` and `any` are process-wide singletons: every
//! call hands out the same descriptor. `literal` mints a new one per call.
use once_cell::sync::Lazy;
use serde_json::{Number, Value};

use crate::descriptor::Ty;
use crate::outcome::{Invalid, describe};
use crate::schema::Schema;

/// JSON numbers pass unchanged; numeric strings coerce.
///
/// A string coerces when its trimmed text parses as a finite number. Integers
/// stay integers (`"42"` → `42`, `"4.5"` → `4.5`). Anything else fails,
/// including the word `"string"`.
pub fn number() -> Ty {
    NUMBER.clone()
}

pub fn string() -> Ty {
    STRING.clone()
}

/// `"true"` and `"false"` coerce; JSON booleans pass.
pub fn boolean() -> Ty {
    BOOLEAN.clone()
}

/// Accepts exactly `expected` and yields it.
pub fn literal(expected: impl Into<Value>) -> Ty {
    let expected = expected.into();
    let schema_value = expected.clone();
    Ty::new(
        move |input| match input {
            Some(value) if strictly_equal(value, &expected) => Ok(Some(expected.clone())),
            _ => Err(Invalid::new(format!(
                "expected literal {expected}, got {}",
                describe(input)
            ))),
        },
        move || Schema::Literal(schema_value.clone()),
    )
}

/// Accepts everything, unchanged.
pub fn any() -> Ty {
    ANY.clone()
}

static NUMBER: Lazy<Ty> = Lazy::new(|| {
    Ty::new(
        |input| match input {
            Some(Value::Number(_)) => Ok(input.cloned()),
            Some(Value::String(text)) => coerce_number(text)
                .map(Some)
                .ok_or_else(|| Invalid::expected("number", input)),
            _ => Err(Invalid::expected("number", input)),
        },
        || Schema::Number,
    )
});

static STRING: Lazy<Ty> = Lazy::new(|| {
    Ty::new(
        |input| match input {
            Some(Value::String(_)) => Ok(input.cloned()),
            _ => Err(Invalid::expected("string", input)),
        },
        || Schema::String,
    )
});

static BOOLEAN: Lazy<Ty> = Lazy::new(|| {
    Ty::new(
        |input| match input {
            Some(Value::Bool(_)) => Ok(input.cloned()),
            Some(Value::String(text)) if text == "true" => Ok(Some(Value::Bool(true))),
            Some(Value::String(text)) if text == "false" => Ok(Some(Value::Bool(false))),
            _ => Err(Invalid::expected("boolean", input)),
        },
        || Schema::Boolean,
    )
});

static ANY: Lazy<Ty> = Lazy::new(|| Ty::new(|input| Ok(input.cloned()), || Schema::Any));

fn coerce_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Value::from(n));
    }
    let n = text.parse::<f64>().ok().filter(|n| n.is_finite())?;
    Number::from_f64(n).map(Value::Number)
}

// Numbers compare by magnitude so `1` and `1.0` are the same literal.
fn strictly_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_values_pass_unchanged() {
        assert_eq!(number().validate(&json!(1.5)), Ok(json!(1.5)));
        assert_eq!(number().validate(&json!(-7)), Ok(json!(-7)));
        assert_eq!(string().validate(&json!("")), Ok(json!("")));
        assert_eq!(boolean().validate(&json!(false)), Ok(json!(false)));
        assert_eq!(any().validate(&json!({"a": [1]})), Ok(json!({"a": [1]})));
    }

    #[test]
    fn numeric_string_coercion() {
        let ty = number();
        assert_eq!(ty.validate(&json!("42")), Ok(json!(42)));
        assert_eq!(ty.validate(&json!(" 4.5 ")), Ok(json!(4.5)));
        assert_eq!(ty.validate(&json!("18446744073709551615")), Ok(json!(u64::MAX)));
        assert!(ty.validate(&json!("")).is_err());
        assert!(ty.validate(&json!("abc")).is_err());
        assert!(ty.validate(&json!("inf")).is_err());
        assert!(ty.validate(&json!("NaN")).is_err());
        // The word "string" is not a number.
        assert!(ty.validate(&json!("string")).is_err());
    }

    #[test]
    fn number_rejects_other_kinds() {
        let ty = number();
        assert!(ty.validate(&json!(true)).is_err());
        assert!(ty.validate(&Value::Null).is_err());
        assert!(ty.validate_slot(None).is_err());
    }

    #[test]
    fn string_is_exact() {
        assert_eq!(
            string().validate(&json!(1)),
            Err(Invalid::new("expected string, got 1"))
        );
    }

    #[test]
    fn boolean_coercion() {
        let ty = boolean();
        assert_eq!(ty.validate(&json!("true")), Ok(json!(true)));
        assert_eq!(ty.validate(&json!("false")), Ok(json!(false)));
        assert!(ty.validate(&json!("TRUE")).is_err());
        assert!(ty.validate(&json!(1)).is_err());
    }

    #[test]
    fn literal_strict_equality() {
        let one = literal(1);
        assert_eq!(one.validate(&json!(1)), Ok(json!(1)));
        assert_eq!(one.validate(&json!(1.0)), Ok(json!(1)));
        assert_eq!(
            one.validate(&json!("1")),
            Err(Invalid::new(r#"expected literal 1, got "1""#))
        );
        assert_eq!(literal("a").validate(&json!("a")), Ok(json!("a")));
        assert_eq!(literal(Value::Null).validate(&Value::Null), Ok(Value::Null));
        assert!(literal(Value::Null).validate_slot(None).is_err());
        assert_eq!(literal("a").to_json(), &Schema::Literal(json!("a")));
    }

    #[test]
    fn primitives_are_shared() {
        let term = number().call(&json!(1)).unwrap();
        assert!(number().is(&term));
        assert_eq!(string().brand(), string().brand());
        assert_eq!(boolean().brand(), boolean().brand());
        assert_eq!(any().brand(), any().brand());
        assert_ne!(number().brand(), string().brand());
        assert!(std::ptr::eq(number().to_json(), number().to_json()));

        assert_ne!(literal(1).brand(), literal(1).brand());
    }

    #[test]
    fn any_keeps_undefined() {
        assert_eq!(any().validate_slot(None), Ok(None));
    }
}
