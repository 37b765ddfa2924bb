use serde_json::Value;

use crate::descriptor::Ty;
use crate::outcome::Invalid;
use crate::schema::Schema;

/// Arrays whose every element satisfies `item`, checked in index order.
///
/// The first failing element's message is returned as-is, without its index.
pub fn list(item: Ty) -> Ty {
    let item_type = item.clone();
    Ty::new(
        move |input| {
            let Some(Value::Array(elements)) = input else {
                return Err(Invalid::expected("array", input));
            };
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                let value = item.validate_slot(Some(element))?;
                out.push(value.unwrap_or(Value::Null));
            }
            Ok(Some(Value::Array(out)))
        },
        move || Schema::List(Box::new(item_type.to_json().clone())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{boolean, number};
    use serde_json::json;

    #[test]
    fn validates_in_order() {
        let ty = list(number());
        assert_eq!(ty.validate(&json!([1, 2, 3])), Ok(json!([1, 2, 3])));
        assert_eq!(ty.validate(&json!(["1", 2])), Ok(json!([1, 2])));
        assert_eq!(ty.validate(&json!([])), Ok(json!([])));
    }

    #[test]
    fn fails_on_first_bad_element() {
        let ty = list(number());
        assert_eq!(
            ty.validate(&json!([1, "x", true])),
            Err(Invalid::new(r#"expected number, got "x""#))
        );
    }

    #[test]
    fn rejects_non_arrays() {
        let ty = list(boolean());
        assert!(ty.validate(&json!({"0": true})).is_err());
        assert!(ty.validate(&json!("true")).is_err());
        assert!(ty.validate_slot(None).is_err());
    }
}
