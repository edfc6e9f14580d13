//! Resolving and upserting a [`vellum_ptr::Pointer`] against an arena
//! [`Node`] tree, following the same token semantics (array index parse,
//! scalar-descent-is-absence) as the pointer's own RFC 6901 rules. Also
//! distinguishes "cleanly absent" from "structurally incompatible" — a
//! distinction the document engine needs in order to tell `UuidBadLocation`
//! apart from a simply-missing UUID.

use crate::node::{Field, Node};
use bumpalo::collections::{String as BString, Vec as BVec};
use bumpalo::Bump;
use vellum_ptr::{Pointer, Token};

/// Outcome of resolving a pointer for reading (as opposed to [`create`]).
pub enum Resolved<'a, 'alloc> {
    /// The location exists and holds this value (which may itself be `Null`).
    Found(&'a Node<'alloc>),
    /// The location, or one of its parents, is simply missing.
    Absent,
    /// A parent along the path exists but is the wrong container kind (a
    /// scalar, or an array addressed by property) to continue descending.
    BadLocation,
}

fn token_matches(field: &Field<'_>, token: &Token<'_>) -> bool {
    match token {
        Token::Property(p) => field.property.as_str() == *p,
        Token::Index(ind) => field.property.as_str() == ind.to_string(),
        Token::NextIndex => field.property.as_str() == "-",
    }
}

/// Resolve `ptr` against `root` for reading.
pub fn query<'a, 'alloc>(ptr: &Pointer, root: &'a Node<'alloc>) -> Resolved<'a, 'alloc> {
    let mut cur = root;
    for token in ptr.iter() {
        cur = match cur {
            Node::Object(fields) => match fields.iter().find(|f| token_matches(f, &token)) {
                Some(f) => &f.value,
                None => return Resolved::Absent,
            },
            Node::Array(items) => match token {
                Token::Index(ind) => match items.get(ind) {
                    Some(v) => v,
                    None => return Resolved::Absent,
                },
                Token::Property(_) | Token::NextIndex => return Resolved::BadLocation,
            },
            Node::Null => return Resolved::Absent,
            Node::Bool(_) | Node::PosInt(_) | Node::NegInt(_) | Node::Float(_) | Node::String(_) => {
                return Resolved::BadLocation
            }
        };
    }
    Resolved::Found(cur)
}

fn token_key(token: &Token<'_>) -> String {
    match token {
        Token::Property(p) => p.to_string(),
        Token::Index(ind) => ind.to_string(),
        Token::NextIndex => "-".to_string(),
    }
}

/// Resolve `ptr` against `root` for writing, materializing intermediate
/// objects/arrays as needed. Returns `None` only when the document shape is
/// structurally incompatible with the pointer.
pub fn create<'a, 'alloc>(
    ptr: &Pointer,
    mut cur: &'a mut Node<'alloc>,
    alloc: &'alloc Bump,
) -> Option<&'a mut Node<'alloc>> {
    for token in ptr.iter() {
        if matches!(cur, Node::Null) {
            *cur = match token {
                Token::Property(_) => Node::Object(BVec::new_in(alloc)),
                Token::Index(_) | Token::NextIndex => Node::Array(BVec::new_in(alloc)),
            };
        }
        cur = match cur {
            Node::Object(fields) => {
                let key = token_key(&token);
                if let Some(pos) = fields.iter().position(|f| f.property.as_str() == key) {
                    &mut fields[pos].value
                } else {
                    fields.push(Field {
                        property: BString::from_str_in(&key, alloc),
                        value: Node::Null,
                    });
                    let last = fields.len() - 1;
                    &mut fields[last].value
                }
            }
            Node::Array(items) => match token {
                Token::Index(ind) => {
                    if ind >= items.len() {
                        let grow = 1 + ind - items.len();
                        items.extend(std::iter::repeat_with(|| Node::Null).take(grow));
                    }
                    &mut items[ind]
                }
                Token::NextIndex => {
                    items.push(Node::Null);
                    let last = items.len() - 1;
                    &mut items[last]
                }
                Token::Property(_) => return None,
            },
            Node::Bool(_) | Node::PosInt(_) | Node::NegInt(_) | Node::Float(_) | Node::String(_) => {
                return None
            }
            Node::Null => unreachable!("just instantiated above"),
        };
    }
    Some(cur)
}
