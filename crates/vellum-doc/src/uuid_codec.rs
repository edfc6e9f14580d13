//! RFC 4122 UUID parsing and formatting, at the edges of the document
//! engine's UUID get/set operations.

/// The all-zero UUID: what a document reads when its UUID location is
/// absent or JSON `null`.
pub const NIL: [u8; 16] = [0; 16];

/// Parse any RFC 4122 textual form (hyphenated, simple, braced, urn) into
/// its 16-byte big-endian representation.
pub fn parse(s: &str) -> Result<[u8; 16], uuid::Error> {
    Ok(*uuid::Uuid::parse_str(s)?.as_bytes())
}

/// Render 16 bytes as the RFC 4122 hyphenated lowercase textual form — the
/// one form this engine ever writes back into a document.
pub fn format(bytes: [u8; 16]) -> String {
    uuid::Uuid::from_bytes(bytes).to_string()
}
