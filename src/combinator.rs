//! Container combinators.
//!
//! Every combinator is defined purely in terms of the descriptors it wraps:
//! it calls their slot validators and propagates the first failure outward.
//! `union` is the exception, since it must try every alternative before it can
//! report one.
pub mod list;
pub mod obj;
pub mod record;

use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::Ty;
use crate::outcome::Invalid;
use crate::schema::Schema;

pub use list::list;
pub use obj::object;
pub use record::record;

/// `null` and undefined pass through untouched; anything else goes to `inner`.
pub fn nullable(inner: Ty) -> Ty {
    let content = inner.clone();
    Ty::new(
        move |input| match input {
            None | Some(Value::Null) => Ok(input.cloned()),
            Some(_) => inner.validate_slot(input),
        },
        move || Schema::Nullable(Box::new(content.to_json().clone())),
    )
}

/// First successful alternative wins. When all fail, the failure lists every
/// alternative's message, one per line, in order.
pub fn union(alternatives: impl IntoIterator<Item = Ty>) -> Ty {
    let alternatives: Arc<[Ty]> = alternatives.into_iter().collect();
    let described = alternatives.clone();
    Ty::new(
        move |input| {
            if alternatives.is_empty() {
                return Err(Invalid::new("no alternatives"));
            }
            let mut messages = Vec::with_capacity(alternatives.len());
            for alternative in alternatives.iter() {
                match alternative.validate_slot(input) {
                    Ok(value) => return Ok(value),
                    Err(invalid) => messages.push(invalid.into_message()),
                }
            }
            Err(Invalid::new(messages.join("\n")))
        },
        move || Schema::Union(described.iter().map(|ty| ty.to_json().clone()).collect()),
    )
}
