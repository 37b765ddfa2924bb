use serde_json::{Map, Value};

use crate::descriptor::Ty;
use crate::outcome::Invalid;
use crate::schema::Schema;

/// String-keyed maps: every key the input carries is kept, every value must
/// satisfy `value`.
pub fn record(value: Ty) -> Ty {
    let value_type = value.clone();
    Ty::new(
        move |input| {
            let Some(Value::Object(map)) = input else {
                return Err(Invalid::expected("object", input));
            };
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                if let Some(item) = value.validate_slot(Some(item))? {
                    out.insert(key.clone(), item);
                }
            }
            Ok(Some(Value::Object(out)))
        },
        move || Schema::Record(Box::new(value_type.to_json().clone())),
    )
}
