//! The document engine: an arena-backed JSON tree with a declared
//! UUID-location pointer, supporting ingest, UUID get/set, serialization,
//! multi-pointer extraction, and deep hashing.

mod document;
mod error;
mod extract;
mod hash;
mod node;
mod resolve;
mod uuid_codec;

pub use document::Document;
pub use error::{Error, Status};
pub use extract::ValueKind;
pub use uuid_codec::NIL as NIL_UUID;
