//! Path-pattern descriptors.
//!
//! A pattern descriptor accepts strings that match a route pattern and turns
//! the extracted parameters into a typed value through a parameter descriptor:
//!
//! ```
//! use json_brand::{number, object, pattern};
//! use serde_json::json;
//!
//! let item = pattern("/items/:id", object([("id", number())]));
//! assert_eq!(item.validate(&json!("/items/42")), Ok(json!({ "id": 42 })));
//! assert!(item.validate(&json!("/other")).is_err());
//! ```
pub mod route;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::descriptor::Ty;
use crate::error::PatternError;
use crate::outcome::Invalid;
use crate::primitive::string;
use crate::schema::Schema;

pub use route::{RouteOptions, RoutePattern};

/// Parameters extracted from a path, in declaration order.
pub type Params = IndexMap<String, String>;

/// The matching capability a pattern descriptor needs. [`RoutePattern`] is
/// the built-in implementation.
pub trait PathMatcher: Send + Sync {
    /// The pattern text, as recorded in schema documents.
    fn source(&self) -> &str;

    /// Parameters on a match, `None` otherwise.
    fn matches(&self, path: &str) -> Option<Params>;
}

/// Compile `source` with default [`RouteOptions`] and build the descriptor.
///
/// A pattern that fails to compile yields a descriptor that rejects every
/// input with the compile error. Use [`try_pattern`] to see the error up front.
pub fn pattern(source: &str, params: Ty) -> Ty {
    match try_pattern(source, RouteOptions::default(), params.clone()) {
        Ok(ty) => ty,
        Err(error) => {
            tracing::warn!(pattern = source, "{error}");
            let message = error.to_string();
            let params_type = params;
            let source = source.to_string();
            string().pipe(
                move || Schema::Pattern {
                    pattern: source.clone(),
                    params: Box::new(params_type.to_json().clone()),
                },
                move |_| Err(Invalid::new(message.clone())),
            )
        }
    }
}

pub fn try_pattern(source: &str, options: RouteOptions, params: Ty) -> Result<Ty, PatternError> {
    let matcher = RoutePattern::compile(source, options)?;
    Ok(pattern_with(matcher, params))
}

/// Build a pattern descriptor over any matcher.
///
/// The input must first be a string; a non-matching string fails naming both
/// the input and the pattern; the extracted parameters, as an object of
/// strings, are then validated by `params`.
pub fn pattern_with(matcher: impl PathMatcher + 'static, params: Ty) -> Ty {
    let matcher: Arc<dyn PathMatcher> = Arc::new(matcher);
    let described = matcher.clone();
    let params_type = params.clone();
    string().pipe(
        move || Schema::Pattern {
            pattern: described.source().to_string(),
            params: Box::new(params_type.to_json().clone()),
        },
        move |value| {
            let path = value.as_str().unwrap_or_default();
            let Some(found) = matcher.matches(path) else {
                return Err(Invalid::new(format!(
                    "{value} does not match pattern {}",
                    matcher.source()
                )));
            };
            let found: Map<String, Value> = found
                .into_iter()
                .map(|(name, text)| (name, Value::String(text)))
                .collect();
            params.validate(&Value::Object(found))
        },
    )
}
