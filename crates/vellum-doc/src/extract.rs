//! Ordered multi-pointer field extraction.
//!
//! The short-return, caller-owned-buffer protocol is an ABI-level concern
//! handled by `vellum-ffi`; this crate's API produces the full descriptor
//! list and byte buffer in one pass, and the FFI layer copies as much of it
//! as fits into the caller's buffer.

use crate::node::{self, Node};
use crate::resolve::{query, Resolved};
use std::ops::Range;
use vellum_ptr::Pointer;

/// What was found at one extracted pointer. `String`/`Object`/`Array`
/// variants carry a byte range into the extraction's output buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    DoesNotExist,
    Null,
    True,
    False,
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    String(Range<usize>),
    Object(Range<usize>),
    Array(Range<usize>),
}

/// Extract the value at each of `ptrs`, in order, against `root`. Returns
/// one [`ValueKind`] per input pointer plus the backing byte buffer that the
/// `String`/`Object`/`Array` ranges index into.
pub fn extract_fields(root: &Node<'_>, ptrs: &[Pointer]) -> (Vec<ValueKind>, Vec<u8>) {
    let mut out = Vec::new();
    let mut kinds = Vec::with_capacity(ptrs.len());

    for ptr in ptrs {
        let kind = match query(ptr, root) {
            Resolved::Absent | Resolved::BadLocation => ValueKind::DoesNotExist,
            Resolved::Found(Node::Null) => ValueKind::Null,
            Resolved::Found(Node::Bool(true)) => ValueKind::True,
            Resolved::Found(Node::Bool(false)) => ValueKind::False,
            Resolved::Found(Node::PosInt(n)) => ValueKind::Unsigned(*n),
            Resolved::Found(Node::NegInt(n)) => ValueKind::Signed(*n),
            Resolved::Found(Node::Float(f)) => ValueKind::Float(*f),
            Resolved::Found(Node::String(s)) => {
                let begin = out.len();
                out.extend_from_slice(s.as_bytes());
                ValueKind::String(begin..out.len())
            }
            Resolved::Found(found @ Node::Array(_)) => {
                let begin = out.len();
                node::write_compact(found, &mut out);
                ValueKind::Array(begin..out.len())
            }
            Resolved::Found(found @ Node::Object(_)) => {
                let begin = out.len();
                node::write_compact(found, &mut out);
                ValueKind::Object(begin..out.len())
            }
        };
        kinds.push(kind);
    }

    (kinds, out)
}

#[cfg(test)]
mod test {
    use super::*;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extraction_tags_fixture() {
        let alloc = Bump::new();
        let value: serde_json::Value = serde_json::from_str(
            r#"{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8",
                "arr":[{"true":true},false],
                "obj":{"null":null},
                "nums":{"u":23,"s":-42,"f":42.5}}"#,
        )
        .unwrap();
        let root = Node::from_value(&value, &alloc);

        let ptrs: Vec<Pointer> = [
            "/uuid",
            "/arr/0/true",
            "/arr/1",
            "/arr/0/missing",
            "/obj/null",
            "/nums/u",
            "/nums/s",
            "/nums/f",
            "/arr",
            "/obj",
        ]
        .iter()
        .map(|s| Pointer::try_from(*s).unwrap())
        .collect();

        let (kinds, buf) = extract_fields(&root, &ptrs);

        assert!(matches!(kinds[0], ValueKind::String(_)));
        assert_eq!(kinds[1], ValueKind::True);
        assert_eq!(kinds[2], ValueKind::False);
        assert_eq!(kinds[3], ValueKind::DoesNotExist);
        assert_eq!(kinds[4], ValueKind::Null);
        assert_eq!(kinds[5], ValueKind::Unsigned(23));
        assert_eq!(kinds[6], ValueKind::Signed(-42));
        assert_eq!(kinds[7], ValueKind::Float(42.5));

        match &kinds[8] {
            ValueKind::Array(r) => assert_eq!(&buf[r.clone()], br#"[{"true":true},false]"#),
            other => panic!("expected Array, got {other:?}"),
        }
        match &kinds[9] {
            ValueKind::Object(r) => assert_eq!(&buf[r.clone()], br#"{"null":null}"#),
            other => panic!("expected Object, got {other:?}"),
        }

        if let ValueKind::String(r) = &kinds[0] {
            assert_eq!(&buf[r.clone()], b"7367f4f3-7668-4370-b06f-021c828d6ed8");
        }
    }
}
