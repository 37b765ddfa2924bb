//! Schema documents back into descriptors.
//!
//! The inverse of [`Ty::to_json`]: lets tooling ship a schema document and have
//! the receiving side validate against it. `Ref` nodes are looked up by name in
//! a [`Registry`].
use indexmap::IndexMap;

use crate::combinator::{list, nullable, object, record, union};
use crate::descriptor::Ty;
use crate::error::LowerError;
use crate::pattern::{RouteOptions, try_pattern};
use crate::primitive::{any, boolean, literal, number, string};
use crate::schema::Schema;
use crate::thunk::json;

/// Named descriptors available to `Ref` nodes, plus the options used to
/// compile `Pattern` nodes.
#[derive(Debug, Clone)]
pub struct Registry {
    named: IndexMap<String, Ty>,
    route_options: RouteOptions,
}

impl Default for Registry {
    /// Binds `"Json"` to the shared recursive JSON descriptor.
    fn default() -> Self {
        Self::empty().with("Json", json())
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            named: IndexMap::new(),
            route_options: RouteOptions::default(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, ty: Ty) -> Self {
        self.named.insert(name.into(), ty);
        self
    }

    pub fn with_route_options(mut self, options: RouteOptions) -> Self {
        self.route_options = options;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.named.get(name)
    }
}

pub fn lower_schema(schema: &Schema, registry: &Registry) -> Result<Ty, LowerError> {
    let ty = match schema {
        Schema::Number => number(),
        Schema::String => string(),
        Schema::Boolean => boolean(),
        Schema::Any => any(),
        Schema::Literal(value) => literal(value.clone()),
        Schema::List(item) => list(lower_schema(item, registry)?),
        Schema::Record(value) => record(lower_schema(value, registry)?),
        Schema::Nullable(content) => nullable(lower_schema(content, registry)?),
        Schema::Object(fields) => {
            let fields = fields
                .iter()
                .map(|field| -> Result<_, LowerError> {
                    Ok((field.key.clone(), lower_schema(&field.ty, registry)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            object(fields)
        }
        Schema::Union(alternatives) => {
            let alternatives = alternatives
                .iter()
                .map(|alternative| lower_schema(alternative, registry))
                .collect::<Result<Vec<_>, _>>()?;
            union(alternatives)
        }
        Schema::Pattern { pattern, params } => {
            let params = lower_schema(params, registry)?;
            try_pattern(pattern, registry.route_options, params)?
        }
        Schema::Ref(name) => registry
            .get(name)
            .cloned()
            .ok_or_else(|| LowerError::UnknownRef(name.clone()))?,
    };
    Ok(ty)
}
