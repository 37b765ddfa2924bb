//! The descriptor factory.
//!
//! A [`Ty`] binds one validation function and one schema function to a freshly
//! minted [`Brand`]. Everything else in the crate (primitives, combinators,
//! thunks, patterns) is built through [`Ty::new`] or [`Ty::pipe`].
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{ReentrantMutex, const_reentrant_mutex};
use serde_json::Value;

use crate::brand::{Brand, Term};
use crate::error::TypeError;
use crate::outcome::Outcome;
use crate::schema::Schema;
use crate::thunk::ThunkState;

type ValidateFn = dyn Fn(Option<&Value>) -> Outcome<Option<Value>> + Send + Sync;
type SchemaFn = dyn Fn() -> Schema + Send + Sync;

// Held while any schema cache is being filled. Schema functions read other
// descriptors' schemas, so a per-cell initializer lock alone could deadlock two
// threads serializing mutually recursive thunks from opposite ends.
static SCHEMA_LOCK: ReentrantMutex<()> = const_reentrant_mutex(());

/// A runtime type descriptor.
///
/// Cloning is cheap and yields the *same* descriptor: clones share the brand
/// and the cached schema.
#[derive(Clone)]
pub struct Ty {
    inner: Arc<Inner>,
}

struct Inner {
    brand: Brand,
    validate: Box<ValidateFn>,
    describe: Describe,
}

enum Describe {
    /// Serialized at most once, on first request.
    Eager {
        to_json: Box<SchemaFn>,
        cache: OnceCell<Schema>,
    },
    /// Delegates to the resolved target of a thunk.
    Deferred(Arc<ThunkState>),
}

impl Ty {
    /// Build a descriptor from a validation function over input slots
    /// (`None` = undefined) and a schema function.
    pub fn new<V, S>(validate: V, to_json: S) -> Self
    where
        V: Fn(Option<&Value>) -> Outcome<Option<Value>> + Send + Sync + 'static,
        S: Fn() -> Schema + Send + Sync + 'static,
    {
        Self::with_describe(
            Box::new(validate),
            Describe::Eager {
                to_json: Box::new(to_json),
                cache: OnceCell::new(),
            },
        )
    }

    pub(crate) fn deferred<V>(brand: Brand, validate: V, state: Arc<ThunkState>) -> Self
    where
        V: Fn(Option<&Value>) -> Outcome<Option<Value>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                brand,
                validate: Box::new(validate),
                describe: Describe::Deferred(state),
            }),
        }
    }

    fn with_describe(validate: Box<ValidateFn>, describe: Describe) -> Self {
        Self {
            inner: Arc::new(Inner {
                brand: Brand::mint(),
                validate,
                describe,
            }),
        }
    }

    pub fn brand(&self) -> Brand {
        self.inner.brand
    }

    /// Validate a present value. An undefined result is reported as `null`.
    pub fn validate(&self, value: &Value) -> Outcome<Value> {
        self.validate_slot(Some(value))
            .map(|out| out.unwrap_or(Value::Null))
    }

    /// Validate an input slot; `None` stands for an absent value.
    pub fn validate_slot(&self, input: Option<&Value>) -> Outcome<Option<Value>> {
        (self.inner.validate)(input)
    }

    /// Validate and brand. This is the fail-fast entry point: an invalid input
    /// becomes a [`TypeError::Invalid`].
    pub fn call(&self, value: &Value) -> Result<Term, TypeError> {
        match self.validate(value) {
            Ok(value) => Ok(Term::new(self.brand(), value)),
            Err(invalid) => {
                tracing::trace!(brand = %self.brand(), "rejected: {invalid}");
                Err(invalid.into())
            }
        }
    }

    /// Brand check. Never inspects the value.
    pub fn is(&self, term: &Term) -> bool {
        term.brand() == self.brand()
    }

    pub fn assert(&self, term: &Term) -> Result<(), TypeError> {
        if self.is(term) {
            Ok(())
        } else {
            Err(TypeError::BrandMismatch {
                expected: self.brand(),
                found: term.brand(),
            })
        }
    }

    /// Derive a new descriptor that runs `next_validate` on this descriptor's
    /// success value. Failures of this descriptor are returned untouched. The
    /// derived schema is exactly `next_to_json`.
    pub fn pipe<S, V>(&self, next_to_json: S, next_validate: V) -> Ty
    where
        S: Fn() -> Schema + Send + Sync + 'static,
        V: Fn(Value) -> Outcome<Value> + Send + Sync + 'static,
    {
        let base = self.clone();
        Ty::new(
            move |input| match base.validate_slot(input)? {
                Some(value) => next_validate(value).map(Some),
                None => Ok(None),
            },
            next_to_json,
        )
    }

    /// Schema document, computed once per descriptor instance.
    pub fn to_json(&self) -> &Schema {
        match &self.inner.describe {
            Describe::Eager { to_json, cache } => {
                if let Some(schema) = cache.get() {
                    return schema;
                }
                let _guard = SCHEMA_LOCK.lock();
                cache.get_or_init(|| to_json())
            }
            Describe::Deferred(state) => state.schema(),
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Ty");
        out.field("brand", &self.brand());
        if let Describe::Eager { cache, .. } = &self.inner.describe {
            if let Some(schema) = cache.get() {
                out.field("schema", schema);
            }
        }
        out.finish()
    }
}
