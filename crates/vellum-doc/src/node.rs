//! The arena-backed JSON value tree that a [`crate::Document`] owns.
//!
//! `Node` is deliberately shaped like `serde_json::Value` but every
//! variable-length payload (`String`, `Array`, `Object`) lives in a
//! `bumpalo::Bump` rather than behind a separate heap allocation per node.

use bumpalo::collections::{String as BString, Vec as BVec};
use bumpalo::Bump;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};

/// One parsed JSON value, with variable-length payloads arena-allocated.
pub enum Node<'alloc> {
    Null,
    Bool(bool),
    PosInt(u64),
    NegInt(i64),
    Float(f64),
    String(BString<'alloc>),
    Array(BVec<'alloc, Node<'alloc>>),
    Object(BVec<'alloc, Field<'alloc>>),
}

/// One key/value pair of an [`Node::Object`], in insertion order.
pub struct Field<'alloc> {
    pub property: BString<'alloc>,
    pub value: Node<'alloc>,
}

impl<'alloc> Node<'alloc> {
    /// Copy a `serde_json::Value` tree into the arena.
    pub fn from_value(v: &serde_json::Value, alloc: &'alloc Bump) -> Node<'alloc> {
        match v {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Node::PosInt(u)
                } else if let Some(i) = n.as_i64() {
                    Node::NegInt(i)
                } else {
                    Node::Float(n.as_f64().expect("non-integer JSON number is representable as f64"))
                }
            }
            serde_json::Value::String(s) => Node::String(BString::from_str_in(s, alloc)),
            serde_json::Value::Array(items) => {
                let mut out = BVec::with_capacity_in(items.len(), alloc);
                for item in items {
                    out.push(Node::from_value(item, alloc));
                }
                Node::Array(out)
            }
            serde_json::Value::Object(map) => {
                let mut out = BVec::with_capacity_in(map.len(), alloc);
                for (k, v) in map {
                    out.push(Field {
                        property: BString::from_str_in(k, alloc),
                        value: Node::from_value(v, alloc),
                    });
                }
                Node::Object(out)
            }
        }
    }

    /// An empty object node, the starting body of every freshly constructed
    /// document.
    pub fn empty_object(alloc: &'alloc Bump) -> Node<'alloc> {
        Node::Object(BVec::new_in(alloc))
    }
}

/// Serializing a `Node` through `serde` (rather than hand-writing a JSON
/// writer) means float formatting, string escaping, and number formatting
/// all come from the same `serde_json` code that parsed the document in the
/// first place.
impl<'alloc> serde::Serialize for Node<'alloc> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => s.serialize_unit(),
            Node::Bool(b) => s.serialize_bool(*b),
            Node::PosInt(n) => s.serialize_u64(*n),
            Node::NegInt(n) => s.serialize_i64(*n),
            Node::Float(f) => s.serialize_f64(*f),
            Node::String(v) => s.serialize_str(v.as_str()),
            Node::Array(items) => {
                let mut seq = s.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(fields) => {
                let mut map = s.serialize_map(Some(fields.len()))?;
                for field in fields.iter() {
                    map.serialize_entry(field.property.as_str(), &field.value)?;
                }
                map.end()
            }
        }
    }
}

/// Serialize `node` as compact JSON (no insignificant whitespace) into `out`.
pub fn write_compact(node: &Node<'_>, out: &mut Vec<u8>) {
    serde_json::to_writer(out, node).expect("in-memory Vec<u8> writer is infallible");
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_value_and_write_compact_round_trip() {
        let alloc = Bump::new();
        let value: serde_json::Value = serde_json::from_str(
            r#"{"b":true,"n":null,"arr":[1,-2,2.5],"s":"hi\nthere"}"#,
        )
        .unwrap();
        let node = Node::from_value(&value, &alloc);

        let mut out = Vec::new();
        write_compact(&node, &mut out);

        let reparsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(reparsed, value);
    }
}
