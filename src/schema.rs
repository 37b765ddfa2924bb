//! Strongly-typed schema documents.
//!
//! [`Schema`] is what descriptors describe themselves as. Its serde form is a
//! fixed grammar consumed by docs and client codegen, so the wire shape lives in
//! a private mirror ([`Doc`]) and the public enum stays pleasant to match on.
//!
//! ```text
//! "number" | "string" | "boolean"
//! { "type": "Any" }
//! { "type": "List",     "itemType": S }
//! { "type": "Object",   "fields": [{ "key": k, "type": S }, ...] }
//! { "type": "Nullable", "contentType": S }
//! { "type": "Union",    "contentTypes": [S, ...] }
//! { "type": "Literal",  "literal": v }
//! { "type": "Record",   "valueType": S }
//! { "type": "Pattern",  "pattern": p, "paramsType": S }
//! { "type": "Ref",      "name": n }          // recursion back-edge
//! ```
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Doc", from = "Doc")]
pub enum Schema {
    Number,
    String,
    Boolean,
    Any,
    List(Box<Schema>),
    Object(Vec<Field>),      // declaration order
    Nullable(Box<Schema>),
    Union(Vec<Schema>),      // alternative order
    Literal(Value),
    Record(Box<Schema>),
    Pattern { pattern: String, params: Box<Schema> },
    /// Points back at an enclosing recursive descriptor by name.
    Ref(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    #[serde(rename = "type")]
    pub ty: Schema,
}

impl Schema {
    pub fn to_value(&self) -> Value {
        // Schema → Doc → Value cannot fail: every leaf is already JSON.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// WIRE FORM
// ————————————————————————————————————————————————————————————————————————————

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Doc {
    Primitive(Primitive),
    Node(Node),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Primitive {
    Number,
    String,
    Boolean,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum Node {
    Any,
    List {
        #[serde(rename = "itemType")]
        item_type: Box<Schema>,
    },
    Object {
        fields: Vec<Field>,
    },
    Nullable {
        #[serde(rename = "contentType")]
        content_type: Box<Schema>,
    },
    Union {
        #[serde(rename = "contentTypes")]
        content_types: Vec<Schema>,
    },
    Literal {
        literal: Value,
    },
    Record {
        #[serde(rename = "valueType")]
        value_type: Box<Schema>,
    },
    Pattern {
        pattern: String,
        #[serde(rename = "paramsType")]
        params_type: Box<Schema>,
    },
    Ref {
        name: String,
    },
}

impl From<Schema> for Doc {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::Number => Doc::Primitive(Primitive::Number),
            Schema::String => Doc::Primitive(Primitive::String),
            Schema::Boolean => Doc::Primitive(Primitive::Boolean),
            Schema::Any => Doc::Node(Node::Any),
            Schema::List(item_type) => Doc::Node(Node::List { item_type }),
            Schema::Object(fields) => Doc::Node(Node::Object { fields }),
            Schema::Nullable(content_type) => Doc::Node(Node::Nullable { content_type }),
            Schema::Union(content_types) => Doc::Node(Node::Union { content_types }),
            Schema::Literal(literal) => Doc::Node(Node::Literal { literal }),
            Schema::Record(value_type) => Doc::Node(Node::Record { value_type }),
            Schema::Pattern { pattern, params } => Doc::Node(Node::Pattern {
                pattern,
                params_type: params,
            }),
            Schema::Ref(name) => Doc::Node(Node::Ref { name }),
        }
    }
}

impl From<Doc> for Schema {
    fn from(doc: Doc) -> Self {
        match doc {
            Doc::Primitive(Primitive::Number) => Schema::Number,
            Doc::Primitive(Primitive::String) => Schema::String,
            Doc::Primitive(Primitive::Boolean) => Schema::Boolean,
            Doc::Node(Node::Any) => Schema::Any,
            Doc::Node(Node::List { item_type }) => Schema::List(item_type),
            Doc::Node(Node::Object { fields }) => Schema::Object(fields),
            Doc::Node(Node::Nullable { content_type }) => Schema::Nullable(content_type),
            Doc::Node(Node::Union { content_types }) => Schema::Union(content_types),
            Doc::Node(Node::Literal { literal }) => Schema::Literal(literal),
            Doc::Node(Node::Record { value_type }) => Schema::Record(value_type),
            Doc::Node(Node::Pattern { pattern, params_type }) => Schema::Pattern {
                pattern,
                params: params_type,
            },
            Doc::Node(Node::Ref { name }) => Schema::Ref(name),
        }
    }
}
