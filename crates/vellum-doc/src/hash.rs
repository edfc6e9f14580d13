//! Deterministic, field-order-sensitive deep hashing over a sequence of
//! pointers.
//!
//! The combine step is the classic boost-style 32-bit mix. The accumulator
//! here is 64 bits, produced by running that 32-bit combine independently
//! across each 32-bit lane of the running value, per spec: "upcast to
//! 64-bit by repeating across the two halves".

use crate::node::Node;
use crate::resolve::{query, Resolved};
use vellum_ptr::Pointer;

const MAGIC: u32 = 0x9e3779b9;

fn combine32(a: u32, b: u32) -> u32 {
    a ^ (b
        .wrapping_add(MAGIC)
        .wrapping_add(a << 6)
        .wrapping_add(a >> 2))
}

/// Fold `h` into accumulator `acc`, lane-wise.
fn fold(acc: u64, h: u64) -> u64 {
    let acc_lo = acc as u32;
    let acc_hi = (acc >> 32) as u32;
    let h_lo = h as u32;
    let h_hi = (h >> 32) as u32;
    let lo = combine32(acc_lo, h_lo);
    let hi = combine32(acc_hi, h_hi);
    ((hi as u64) << 32) | lo as u64
}

const SALT_NULL: u64 = 0x1;
const SALT_TRUE: u64 = 0x2;
const SALT_FALSE: u64 = 0x3;
const SALT_INT: u64 = 0x4;
const SALT_FLOAT: u64 = 0x5;
const SALT_STRING: u64 = 0x6;
const SALT_ARRAY: u64 = 0x7;
const SALT_OBJECT: u64 = 0x8;

/// Stable value-hash of `node`, per the canonicalization rules in §4.3:
/// integers hash on integer value, floats canonicalize `-0`/NaN before
/// hashing their bit pattern, and an integer is never equal in hash to a
/// float of the same mathematical value (they carry different salts).
fn value_hash(node: Option<&Node<'_>>) -> u64 {
    match node {
        None | Some(Node::Null) => fold(SALT_NULL, 0),
        Some(Node::Bool(true)) => fold(SALT_TRUE, 0),
        Some(Node::Bool(false)) => fold(SALT_FALSE, 0),
        Some(Node::PosInt(n)) => fold(SALT_INT, fxhash::hash64(&(*n as i128))),
        Some(Node::NegInt(n)) => fold(SALT_INT, fxhash::hash64(&(*n as i128))),
        Some(Node::Float(f)) => {
            let canon = if *f == 0.0 {
                0.0_f64
            } else if f.is_nan() {
                f64::NAN
            } else {
                *f
            };
            fold(SALT_FLOAT, fxhash::hash64(&canon.to_bits()))
        }
        Some(Node::String(s)) => fold(SALT_STRING, fxhash::hash64(s.as_bytes())),
        Some(Node::Array(items)) => {
            let mut acc = SALT_ARRAY;
            for item in items.iter() {
                acc = fold(acc, value_hash(Some(item)));
            }
            acc
        }
        Some(Node::Object(fields)) => {
            let mut acc = SALT_OBJECT;
            for field in fields.iter() {
                acc = fold(acc, fxhash::hash64(field.property.as_bytes()));
                acc = fold(acc, value_hash(Some(&field.value)));
            }
            acc
        }
    }
}

/// Compute the combined deep hash of `root` over `ptrs`, in order.
pub fn hash_fields(root: &Node<'_>, ptrs: &[Pointer]) -> u64 {
    let mut acc = 0u64;
    for ptr in ptrs {
        let found = match query(ptr, root) {
            Resolved::Found(v) => Some(v),
            Resolved::Absent | Resolved::BadLocation => None,
        };
        acc = fold(acc, value_hash(found));
    }
    acc
}

#[cfg(test)]
mod test {
    use super::*;
    use bumpalo::Bump;

    fn doc() -> (Bump, &'static str) {
        (
            Bump::new(),
            r#"{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8",
                "arr":[{"true":true},false],
                "obj":{"null":null},
                "nums":{"u":23,"s":-42,"f":42.5}}"#,
        )
    }

    #[test]
    fn test_zero_pointers_hashes_zero() {
        let (alloc, text) = doc();
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        let root = Node::from_value(&value, &alloc);
        assert_eq!(hash_fields(&root, &[]), 0);
    }

    #[test]
    fn test_repetition_and_order_sensitivity() {
        let (alloc, text) = doc();
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        let root = Node::from_value(&value, &alloc);

        let p = Pointer::try_from("/nums/u").unwrap();
        let once = hash_fields(&root, &[p.clone()]);
        let twice = hash_fields(&root, &[p.clone(), p.clone()]);
        assert_ne!(once, twice);

        let missing = Pointer::try_from("/does/not/exist").unwrap();
        let null_ptr = Pointer::try_from("/obj/null").unwrap();
        assert_eq!(
            hash_fields(&root, &[missing.clone(), null_ptr.clone()]),
            hash_fields(&root, &[null_ptr.clone(), missing.clone()])
        );

        let a = Pointer::try_from("/nums/u").unwrap();
        let b = Pointer::try_from("/nums/s").unwrap();
        assert_ne!(
            hash_fields(&root, &[a.clone(), b.clone()]),
            hash_fields(&root, &[b, a])
        );
    }

    #[test]
    fn test_hash_invariant_across_reserialization() {
        let (alloc, text) = doc();
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        let root = Node::from_value(&value, &alloc);

        let mut out = Vec::new();
        crate::node::write_compact(&root, &mut out);
        let reparsed_value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let alloc2 = Bump::new();
        let root2 = Node::from_value(&reparsed_value, &alloc2);

        let ptrs = vec![
            Pointer::try_from("/uuid").unwrap(),
            Pointer::try_from("/arr").unwrap(),
            Pointer::try_from("/nums/f").unwrap(),
        ];
        assert_eq!(hash_fields(&root, &ptrs), hash_fields(&root2, &ptrs));
    }
}
