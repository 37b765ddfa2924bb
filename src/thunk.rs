//! Lazily resolved descriptors, for recursive schemas.
//!
//! A thunk holds a factory that is run at most once, on first use, and whose
//! result is reused forever after. A descriptor declared in a `Lazy` static can
//! therefore name itself inside its own factory:
//!
//! ```
//! use json_brand::{Ty, list, number, object, thunk_named};
//! use once_cell::sync::Lazy;
//!
//! static TREE: Lazy<Ty> = Lazy::new(|| {
//!     thunk_named("Tree", || object([
//!         ("value", number()),
//!         ("children", list(TREE.clone())),
//!     ]))
//! });
//!
//! let tree = serde_json::json!({ "value": 1, "children": [{ "value": 2, "children": [] }] });
//! assert!(TREE.validate(&tree).is_ok());
//! ```
use std::cell::RefCell;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use serde_json::Value;

use crate::brand::Brand;
use crate::combinator::{list, record, union};
use crate::descriptor::Ty;
use crate::primitive::{boolean, literal, number, string};
use crate::schema::Schema;

thread_local! {
    // Thunks whose target schema is being computed on this thread.
    static SERIALIZING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

pub(crate) struct ThunkState {
    name: String,
    factory: Box<dyn Fn() -> Ty + Send + Sync>,
    target: OnceCell<Ty>,
    back_edge: Schema,
}

impl ThunkState {
    fn target(&self) -> &Ty {
        self.target.get_or_init(|| {
            tracing::debug!(thunk = %self.name, "resolving thunk");
            (self.factory)()
        })
    }

    /// The target's schema, or a `Ref` back-edge when asked re-entrantly while
    /// that schema is still being built.
    pub(crate) fn schema(&self) -> &Schema {
        let key = self as *const Self as usize;
        if SERIALIZING.with(|active| active.borrow().contains(&key)) {
            return &self.back_edge;
        }
        SERIALIZING.with(|active| active.borrow_mut().push(key));
        let _unmark = Unmark(key);
        self.target().to_json()
    }
}

struct Unmark(usize);

impl Drop for Unmark {
    fn drop(&mut self) {
        SERIALIZING.with(|active| active.borrow_mut().retain(|key| *key != self.0));
    }
}

/// A descriptor whose definition is produced by `factory` on first use.
///
/// Its schema refers back to itself as `{"type": "Ref", "name": "thunk#N"}`.
pub fn thunk<F>(factory: F) -> Ty
where
    F: Fn() -> Ty + Send + Sync + 'static,
{
    let brand = Brand::mint();
    build(brand, format!("thunk{brand}"), Box::new(factory))
}

/// Like [`thunk`], with the name used in recursive schema references.
pub fn thunk_named<F>(name: impl Into<String>, factory: F) -> Ty
where
    F: Fn() -> Ty + Send + Sync + 'static,
{
    build(Brand::mint(), name.into(), Box::new(factory))
}

fn build(brand: Brand, name: String, factory: Box<dyn Fn() -> Ty + Send + Sync>) -> Ty {
    let state = Arc::new(ThunkState {
        back_edge: Schema::Ref(name.clone()),
        name,
        factory,
        target: OnceCell::new(),
    });
    let resolved = state.clone();
    Ty::deferred(
        brand,
        move |input| resolved.target().validate_slot(input),
        state,
    )
}

static JSON: Lazy<Ty> = Lazy::new(|| {
    thunk_named("Json", || {
        // Strings go first so text such as "42" or "true" is kept verbatim.
        union([
            string(),
            number(),
            boolean(),
            literal(Value::Null),
            list(json()),
            record(json()),
        ])
    })
});

/// Any JSON value, recursively. Shared process-wide.
pub fn json() -> Ty {
    JSON.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::object;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let ty = thunk(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            number()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        for n in 0..10 {
            assert_eq!(ty.validate(&json!(n)), Ok(json!(n)));
        }
        assert_eq!(ty.to_json(), &Schema::Number);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    static NODE_BUILDS: AtomicUsize = AtomicUsize::new(0);
    static NODE: Lazy<Ty> = Lazy::new(|| {
        thunk_named("Node", || {
            NODE_BUILDS.fetch_add(1, Ordering::SeqCst);
            object([("next", crate::combinator::nullable(NODE.clone()))])
        })
    });

    #[test]
    fn self_reference_resolves_once() {
        let chain = json!({"next": {"next": {"next": null}}});
        for _ in 0..5 {
            assert_eq!(NODE.validate(&chain), Ok(chain.clone()));
        }
        assert!(NODE.validate(&json!({"next": {"next": 1}})).is_err());
        assert_eq!(NODE_BUILDS.load(Ordering::SeqCst), 1);

        assert_eq!(
            NODE.to_json().to_value(),
            json!({
                "type": "Object",
                "fields": [{
                    "key": "next",
                    "type": { "type": "Nullable", "contentType": { "type": "Ref", "name": "Node" } }
                }]
            })
        );
    }

    #[test]
    fn thunk_terms_carry_the_thunk_brand() {
        let ty = thunk(number);
        let term = ty.call(&json!(1)).unwrap();
        assert!(ty.is(&term));
        assert!(ty.is(&ty.call(&json!(2)).unwrap()));
    }

    #[test]
    fn json_accepts_any_document() {
        let doc = json!({"a": [1, "2", true, null, {"b": []}], "c": "true"});
        assert_eq!(json().validate(&doc), Ok(doc.clone()));
        assert!(json().validate_slot(None).is_err());
    }

    #[test]
    fn json_schema_is_stable_and_recursive() {
        let first: *const Schema = json().to_json();
        let second: *const Schema = json().to_json();
        assert!(std::ptr::eq(first, second));
        assert_eq!(
            json().to_json().to_value(),
            json!({
                "type": "Union",
                "contentTypes": [
                    "string",
                    "number",
                    "boolean",
                    { "type": "Literal", "literal": null },
                    { "type": "List", "itemType": { "type": "Ref", "name": "Json" } },
                    { "type": "Record", "valueType": { "type": "Ref", "name": "Json" } }
                ]
            })
        );
    }

    static PING: Lazy<Ty> = Lazy::new(|| thunk_named("Ping", || slow_list(&PONG)));
    static PONG: Lazy<Ty> = Lazy::new(|| thunk_named("Pong", || slow_list(&PING)));

    // A list whose schema takes a while and reads the other thunk's schema.
    fn slow_list(item: &'static Lazy<Ty>) -> Ty {
        Ty::new(
            |input| Ok(input.cloned()),
            move || {
                std::thread::sleep(std::time::Duration::from_millis(100));
                Schema::List(Box::new(item.to_json().clone()))
            },
        )
    }

    #[test]
    fn mutually_recursive_schemas_from_two_threads() {
        use std::sync::{Barrier, mpsc};
        use std::time::Duration;

        let barrier = Arc::new(Barrier::new(2));
        let (done, finished) = mpsc::channel();
        for ty in [&PING, &PONG] {
            let barrier = barrier.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                barrier.wait();
                done.send(ty.to_json().clone()).ok();
            });
        }
        drop(done);
        for _ in 0..2 {
            let schema = finished
                .recv_timeout(Duration::from_secs(5))
                .expect("schema serialization finished");
            assert!(matches!(schema, Schema::List(_)));
        }

        let ping = Schema::Ref("Ping".into());
        let pong = Schema::Ref("Pong".into());
        let list_of = |item: Schema| Schema::List(Box::new(item));
        // Whichever thread takes the lock first fills both caches.
        assert!(
            (PING.to_json() == &list_of(list_of(ping.clone())) && PONG.to_json() == &list_of(ping))
                || (PONG.to_json() == &list_of(list_of(pong.clone())) && PING.to_json() == &list_of(pong))
        );
    }

    static LOOP: Lazy<Ty> = Lazy::new(|| thunk(|| list(LOOP.clone())));

    #[test]
    fn unnamed_thunk_refs_use_brand() {
        let expected = Schema::List(Box::new(Schema::Ref(format!("thunk{}", LOOP.brand()))));
        assert_eq!(LOOP.to_json(), &expected);
        assert_eq!(LOOP.validate(&json!([[], [[]]])), Ok(json!([[], [[]]])));
        assert!(LOOP.validate(&json!([1])).is_err());
    }
}
