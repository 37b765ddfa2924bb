//! Identity branding.
//!
//! Every descriptor mints a process-unique [`Brand`] when it is built, and every
//! value it accepts through [`Ty::call`](crate::Ty::call) comes back as a
//! [`Term`] carrying that brand. Brand checks compare tokens only; two
//! descriptors with the same structure never recognize each other's terms.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::descriptor::Ty;

static NEXT_BRAND: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token of one descriptor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brand(u64);

impl Brand {
    pub(crate) fn mint() -> Self {
        Brand(NEXT_BRAND.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A validated value tagged with the brand of the descriptor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    brand: Brand,
    value: Value,
}

impl Term {
    pub(crate) fn new(brand: Brand, value: Value) -> Self {
        Self { brand, value }
    }

    pub fn brand(&self) -> Brand {
        self.brand
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Free-standing brand check, same as [`Ty::is`].
pub fn is(term: &Term, ty: &Ty) -> bool {
    ty.is(term)
}
