//! Composable runtime type descriptors for JSON values.
//!
//! A descriptor ([`Ty`]) validates untyped input, coercing where its policy
//! allows, and describes itself as a [`Schema`] document for external tooling.
//! Descriptors compose: primitives, containers, unions, lazily resolved
//! recursion and route-pattern-typed strings are all built from the same
//! factory.
//!
//! ```
//! use json_brand::{list, nullable, number, object, string};
//! use serde_json::json;
//!
//! let user = object([
//!     ("id", number()),
//!     ("name", string()),
//!     ("tags", list(string())),
//!     ("manager", nullable(number())),
//! ]);
//!
//! let input = json!({ "id": "7", "name": "ada", "tags": [], "extra": true });
//! assert_eq!(
//!     user.validate(&input),
//!     Ok(json!({ "id": 7, "name": "ada", "tags": [] })),
//! );
//!
//! // Terms remember which descriptor produced them.
//! let term = user.call(&input).unwrap();
//! assert!(user.is(&term));
//! ```
pub mod brand;
pub mod combinator;
pub mod descriptor;
pub mod error;
pub mod lower;
pub mod outcome;
pub mod path_de;
pub mod pattern;
pub mod primitive;
pub mod schema;
pub mod thunk;

pub use brand::{Brand, Term, is};
pub use combinator::{list, nullable, object, record, union};
pub use descriptor::Ty;
pub use error::{DecodeError, LowerError, PatternError, TypeError};
pub use lower::{Registry, lower_schema};
pub use outcome::{Invalid, Outcome};
pub use pattern::{PathMatcher, RouteOptions, RoutePattern, pattern, pattern_with, try_pattern};
pub use primitive::{any, boolean, literal, number, string};
pub use schema::{Field, Schema};
pub use thunk::{json, thunk, thunk_named};
