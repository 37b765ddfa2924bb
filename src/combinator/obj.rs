use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::descriptor::Ty;
use crate::outcome::Invalid;
use crate::schema::{Field, Schema};

/// Objects with a fixed set of named fields.
///
/// Only the declared fields are looked up, in declaration order; a missing key
/// is validated as undefined. Keys the input carries beyond the declared ones
/// are dropped from the output. Redeclaring a name replaces its descriptor but
/// keeps its original position.
pub fn object<K>(fields: impl IntoIterator<Item = (K, Ty)>) -> Ty
where
    K: Into<String>,
{
    let fields: Arc<IndexMap<String, Ty>> = Arc::new(
        fields
            .into_iter()
            .map(|(key, ty)| (key.into(), ty))
            .collect(),
    );
    let described = fields.clone();
    Ty::new(
        move |input| {
            let Some(Value::Object(map)) = input else {
                return Err(Invalid::expected("object", input));
            };
            let mut out = Map::with_capacity(fields.len());
            for (key, ty) in fields.iter() {
                if let Some(value) = ty.validate_slot(map.get(key))? {
                    out.insert(key.clone(), value);
                }
            }
            Ok(Some(Value::Object(out)))
        },
        move || {
            Schema::Object(
                described
                    .iter()
                    .map(|(key, ty)| Field {
                        key: key.clone(),
                        ty: ty.to_json().clone(),
                    })
                    .collect(),
            )
        },
    )
}
