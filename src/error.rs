//! Errors for the fail-fast entry points and the supplementary layers.
//!
//! Inside the validation pipeline failures are [`Invalid`](crate::Invalid)
//! values. The types here are what callers see once they leave it.
use thiserror::Error;

use crate::brand::Brand;

/// Raised by [`Ty::call`](crate::Ty::call) and [`Ty::assert`](crate::Ty::assert).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The input did not validate.
    #[error("{0}")]
    Invalid(String),

    /// The term was produced by a different descriptor.
    #[error("term branded {found} is not an instance of descriptor {expected}")]
    BrandMismatch { expected: Brand, found: Brand },
}

impl From<crate::Invalid> for TypeError {
    fn from(invalid: crate::Invalid) -> Self {
        TypeError::Invalid(invalid.into_message())
    }
}

/// Deserializing a validated value into a Rust type failed.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {source}")]
pub struct DecodeError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// A route pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("missing parameter name at offset {offset} in `{pattern}`")]
    MissingName { pattern: String, offset: usize },

    #[error("unbalanced `(` at offset {offset} in `{pattern}`")]
    Unbalanced { pattern: String, offset: usize },

    #[error("duplicate parameter `{name}` in `{pattern}`")]
    DuplicateName { pattern: String, name: String },

    #[error("invalid pattern `{pattern}`: {reason}")]
    Regex { pattern: String, reason: String },
}

/// A schema document could not be turned back into a descriptor.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("unknown reference `{0}`")]
    UnknownRef(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}
