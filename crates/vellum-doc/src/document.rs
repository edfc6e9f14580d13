//! The document engine: a parsed JSON tree, its backing arena, and the
//! UUID-location pointer it was constructed with.

use crate::error::Error;
use crate::extract::{self, ValueKind};
use crate::hash;
use crate::node::{self, Node};
use crate::resolve::{self, Resolved};
use crate::uuid_codec;
use bumpalo::collections::String as BString;
use bumpalo::Bump;
use vellum_ptr::Pointer;

/// A parsed JSON document, its arena, and its fixed UUID-location pointer.
///
/// `root` is declared before `arena`: Rust drops struct fields in
/// declaration order, and `root` borrows out of `arena` (via the
/// `'static`-transmute below), so it must be torn down first. `arena` is a
/// `Box<Bump>` rather than a bare `Bump` so that the allocator's address
/// stays fixed no matter how many times the owning `Document` is itself
/// moved — `bumpalo::collections` types hold a `&'bump Bump` back to the
/// allocator, and a bare `Bump` field would dangle that reference across a
/// move.
pub struct Document {
    root: Node<'static>,
    uuid_ptr: Pointer,
    arena: Box<Bump>,
}

impl Document {
    /// Safety: `arena` lives behind a `Box`, so its heap address is stable
    /// across any number of moves of `self`. Every `Node<'static>` reachable
    /// from `root` was allocated out of `self.arena` and this document never
    /// lends a reference shorter than `'static` to a caller, so extending
    /// the borrow here is sound as long as `arena` outlives `root` — which
    /// the field declaration order above guarantees.
    fn alloc(&self) -> &'static Bump {
        unsafe { std::mem::transmute::<&Bump, &'static Bump>(&*self.arena) }
    }

    /// Build an empty document rooted at `uuid_ptr`'s UUID location. The
    /// nested object path down to that location is materialized immediately
    /// and stamped with the placeholder (zero) UUID, so the location is
    /// writable without further structural work.
    pub fn new(uuid_ptr: Pointer) -> Document {
        let mut doc = Document {
            root: Node::Null,
            uuid_ptr,
            arena: Box::new(Bump::new()),
        };
        let alloc = doc.alloc();
        doc.root = Node::empty_object(alloc);
        doc.stamp_uuid_placeholder();
        doc
    }

    fn stamp_uuid_placeholder(&mut self) {
        let alloc = self.alloc();
        let uuid_ptr = self.uuid_ptr.clone();
        if let Some(slot) = resolve::create(&uuid_ptr, &mut self.root, alloc) {
            let text = uuid_codec::format(uuid_codec::NIL);
            *slot = Node::String(BString::from_str_in(&text, alloc));
        }
    }

    /// Build an acknowledgement document: a fresh empty document sharing
    /// this document's UUID-location pointer, with the all-zero UUID (the
    /// host overwrites it via [`Document::set_uuid`]).
    pub fn new_acknowledgement(&self) -> Document {
        Document::new(self.uuid_ptr.clone())
    }

    /// Parse `bytes` as JSON and, if the UUID location validates, replace
    /// this document's body with it. On any error the document is left
    /// exactly as it was before the call (`[Fresh]`, per the state machine).
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let alloc = self.alloc();
        let candidate = Node::from_value(&value, alloc);

        match resolve::query(&self.uuid_ptr, &candidate) {
            Resolved::BadLocation => return Err(Error::UuidBadLocation),
            Resolved::Absent | Resolved::Found(Node::Null) => {}
            Resolved::Found(Node::String(s)) => {
                uuid_codec::parse(s.as_str()).map_err(|_| Error::UuidParseError)?;
            }
            Resolved::Found(_) => return Err(Error::UuidNotAString),
        }

        tracing::debug!(bytes = bytes.len(), "ingested document");
        self.root = candidate;
        Ok(())
    }

    /// The 16 bytes at the UUID location, or all zeros if absent/null.
    pub fn get_uuid(&self) -> [u8; 16] {
        match resolve::query(&self.uuid_ptr, &self.root) {
            Resolved::Found(Node::String(s)) => {
                uuid_codec::parse(s.as_str()).unwrap_or(uuid_codec::NIL)
            }
            _ => uuid_codec::NIL,
        }
    }

    /// Replace the value at the UUID location with the textual form of
    /// `uuid`. Infallible for any document produced by this engine: ingest
    /// already rejected any UUID location that `create` could not
    /// materialize.
    pub fn set_uuid(&mut self, uuid: [u8; 16]) {
        let alloc = self.alloc();
        let uuid_ptr = self.uuid_ptr.clone();
        let text = uuid_codec::format(uuid);
        if let Some(slot) = resolve::create(&uuid_ptr, &mut self.root, alloc) {
            *slot = Node::String(BString::from_str_in(&text, alloc));
        }
    }

    /// Serialize the document as compact JSON terminated by `\n`.
    pub fn marshal_json(&self) -> Vec<u8> {
        let mut out = Vec::new();
        node::write_compact(&self.root, &mut out);
        out.push(b'\n');
        out
    }

    /// Extract the value at each of `ptrs`, in order. See
    /// [`extract::extract_fields`].
    pub fn extract_fields(&self, ptrs: &[Pointer]) -> (Vec<ValueKind>, Vec<u8>) {
        extract::extract_fields(&self.root, ptrs)
    }

    /// The combined deep hash over `ptrs`, in order. See
    /// [`hash::hash_fields`].
    pub fn hash_fields(&self, ptrs: &[Pointer]) -> u64 {
        hash::hash_fields(&self.root, ptrs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn uuid_ptr(s: &str) -> Pointer {
        Pointer::try_from(s).unwrap()
    }

    #[test]
    fn test_scenario_a_round_trip() {
        let mut doc = Document::new(uuid_ptr("/_meta/uuid"));
        doc.ingest(br#"{"_meta":{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8"}}"#)
            .unwrap();

        let u = [
            0x18, 0xcd, 0x06, 0x85, 0xc9, 0x7f, 0x47, 0x0b, 0xa5, 0x85, 0xed, 0x95, 0x1a, 0xda,
            0x17, 0xcf,
        ];
        doc.set_uuid(u);
        assert_eq!(doc.get_uuid(), u);

        assert_eq!(
            doc.marshal_json(),
            b"{\"_meta\":{\"uuid\":\"18cd0685-c97f-470b-a585-ed951ada17cf\"}}\n"
        );
    }

    #[test]
    fn test_scenario_b_acknowledgement() {
        let mut doc = Document::new(uuid_ptr("/_meta/uuid"));
        doc.ingest(br#"{"_meta":{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8"}}"#)
            .unwrap();

        let mut ack = doc.new_acknowledgement();
        let u = [
            0x05, 0x3e, 0xc4, 0xa5, 0x6d, 0x61, 0x45, 0x5c, 0x95, 0xac, 0x15, 0x23, 0xa7, 0xfb,
            0x5a, 0x0b,
        ];
        ack.set_uuid(u);

        assert_eq!(
            ack.marshal_json(),
            b"{\"_meta\":{\"uuid\":\"053ec4a5-6d61-455c-95ac-1523a7fb5a0b\"}}\n"
        );
    }

    #[test]
    fn test_scenario_c_alternate_location() {
        let mut doc = Document::new(uuid_ptr("/_uuid"));
        let u = [
            0x73, 0x67, 0xf4, 0xf3, 0x76, 0x68, 0x43, 0x70, 0xb0, 0x6f, 0x02, 0x1c, 0x82, 0x8d,
            0x6e, 0xd8,
        ];
        doc.set_uuid(u);
        assert_eq!(
            doc.marshal_json(),
            b"{\"_uuid\":\"7367f4f3-7668-4370-b06f-021c828d6ed8\"}\n"
        );
    }

    #[test]
    fn test_ingest_error_surface() {
        let ptr = uuid_ptr("/_meta/uuid");

        let mut doc = Document::new(ptr.clone());
        doc.ingest(br#"{"_meta":{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8"},"bar":1}"#)
            .unwrap();

        let mut doc = Document::new(ptr.clone());
        doc.ingest(br#"{"_meta":{"uuid":null},"bar":1}"#).unwrap();
        assert_eq!(doc.get_uuid(), uuid_codec::NIL);

        let mut doc = Document::new(ptr.clone());
        doc.ingest(br#"{"_meta":{},"bar":1}"#).unwrap();
        assert_eq!(doc.get_uuid(), uuid_codec::NIL);

        let mut doc = Document::new(ptr.clone());
        doc.ingest(br#"{"bar":1}"#).unwrap();
        assert_eq!(doc.get_uuid(), uuid_codec::NIL);

        let mut doc = Document::new(ptr.clone());
        assert!(matches!(doc.ingest(b"{bad json"), Err(Error::Json(_))));

        let mut doc = Document::new(ptr.clone());
        assert!(matches!(
            doc.ingest(br#"{"_meta":[]}"#),
            Err(Error::UuidBadLocation)
        ));

        let mut doc = Document::new(ptr.clone());
        assert!(matches!(
            doc.ingest(br#"{"_meta":{"uuid":42}}"#),
            Err(Error::UuidNotAString)
        ));

        let mut doc = Document::new(ptr);
        assert!(matches!(
            doc.ingest(br#"{"_meta":{"uuid":"bad uuid"}}"#),
            Err(Error::UuidParseError)
        ));
    }

    #[test]
    fn test_failed_ingest_leaves_document_fresh() {
        let mut doc = Document::new(uuid_ptr("/_meta/uuid"));
        let before = doc.marshal_json();
        assert!(doc.ingest(b"{bad json").is_err());
        assert_eq!(doc.marshal_json(), before);
    }

    #[test]
    fn test_serializer_idempotence() {
        let mut doc = Document::new(uuid_ptr("/_meta/uuid"));
        doc.ingest(br#"{"_meta":{"uuid":"7367f4f3-7668-4370-b06f-021c828d6ed8"},"z":1,"a":2}"#)
            .unwrap();
        let first = doc.marshal_json();

        let mut doc2 = Document::new(uuid_ptr("/_meta/uuid"));
        doc2.ingest(&first).unwrap();
        let second = doc2.marshal_json();

        assert_eq!(first, second);
    }
}
