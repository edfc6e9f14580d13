//! RFC 6901 JSON Pointer parsing.
//!
//! A [`Pointer`] is an owned, tape-encoded sequence of [`Token`]s. Parsing
//! rejects any non-empty string that does not begin with `/`, per the
//! well-formedness rule this engine enforces (unlike a permissive reading of
//! RFC 6901 that would just treat such strings as a single bare token).
//! Resolution against a parsed document is `vellum-doc::resolve`'s job, not
//! this crate's — it operates on the arena `Node` tree, not on bare JSON.

use std::fmt;
use std::str::FromStr;
use tinyvec::TinyVec;

mod varint;

/// Errors produced while parsing a JSON Pointer string.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("non-empty JSON pointer must have a leading '/'")]
    NotRooted,
}

/// A parsed JSON Pointer: an owned, tape-encoded sequence of tokens.
///
/// The tape representation keeps small pointers (the common case) inline
/// without a heap allocation, via `TinyVec`.
#[derive(Clone, Eq, PartialEq)]
pub struct Pointer(TinyVec<[u8; 16]>);

/// A single decoded token of a [`Pointer`].
#[derive(Debug, Eq, PartialEq)]
pub enum Token<'t> {
    /// Integer index of a JSON array (also usable as an object property).
    Index(usize),
    /// JSON object property name. Never a bare non-negative integer.
    Property(&'t str),
    /// The `-` token: one past the last index of an array.
    NextIndex,
}

/// Iterator over the [`Token`]s of a [`Pointer`], returned by [`Pointer::iter`].
pub struct Iter<'t>(&'t [u8]);

impl Pointer {
    /// The empty pointer, addressing the document root.
    pub fn root() -> Pointer {
        Pointer(TinyVec::new())
    }

    /// True if this pointer addresses the document root (has no tokens).
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Push a token onto the end of the pointer.
    pub fn push(&mut self, token: Token<'_>) -> &mut Pointer {
        match token {
            Token::Index(ind) => {
                self.0.push(b'I');
                self.enc_varint(ind as u64);
            }
            Token::Property(prop) => {
                self.0.push(b'P');
                let prop = prop.as_bytes();
                self.enc_varint(prop.len() as u64);
                self.0.extend(prop.iter().copied());
            }
            Token::NextIndex => {
                self.0.push(b'-');
            }
        }
        self
    }

    /// Iterate over the tokens of this pointer, in order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(&self.0)
    }

    fn enc_varint(&mut self, n: u64) {
        let mut buf = [0u8; 10];
        let n = varint::write_varu64(&mut buf, n);
        self.0.extend(buf.iter().copied().take(n));
    }

    /// Decode a single token from `s` (after `~1`/`~0` unescaping has
    /// already been applied by the caller) into the appropriate [`Token`]
    /// variant, mirroring RFC 6901 §4's guidance that array indices are
    /// non-negative integers without leading zeros (other than `"0"`
    /// itself) and without a leading `+`.
    fn classify(t: &str) -> Classified {
        if t == "-" {
            Classified::NextIndex
        } else if t.starts_with('+') || (t.starts_with('0') && t.len() > 1) {
            Classified::Property
        } else if usize::from_str(t).is_ok() {
            Classified::Index
        } else {
            Classified::Property
        }
    }
}

enum Classified {
    Index,
    Property,
    NextIndex,
}

impl Default for Pointer {
    fn default() -> Self {
        Self::root()
    }
}

impl TryFrom<&str> for Pointer {
    type Error = Error;

    /// Parse an RFC 6901 JSON Pointer string. The empty string parses to
    /// the root pointer; any other string must begin with `/`.
    fn try_from(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Ok(Pointer::root());
        } else if !s.starts_with('/') {
            return Err(Error::NotRooted);
        }

        let mut tape = Pointer::root();

        for raw in s.split('/').skip(1) {
            let unescaped = raw.replace("~1", "/").replace("~0", "~");
            match Pointer::classify(&unescaped) {
                Classified::NextIndex => tape.push(Token::NextIndex),
                Classified::Index => {
                    tape.push(Token::Index(usize::from_str(&unescaped).unwrap()))
                }
                Classified::Property => {
                    // Property takes an owned copy; `push` needs the bytes only
                    // for the duration of this call, so a short-lived borrow
                    // of `unescaped` is fine here.
                    tape.push(Token::Property(&unescaped))
                }
            };
        }

        Ok(tape)
    }
}

impl<'t> Iterator for Iter<'t> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }
        Some(match self.0[0] {
            b'-' => {
                self.0 = &self.0[1..];
                Token::NextIndex
            }
            b'P' => {
                let (prop_len, prop_len_len) = varint::read_varu64(&self.0[1..]);
                let prop = &self.0[1 + prop_len_len..1 + prop_len_len + prop_len as usize];
                // Safety: only ever written by `Pointer::push`, from a `&str`.
                let prop = unsafe { std::str::from_utf8_unchecked(prop) };
                self.0 = &self.0[1 + prop_len_len + prop_len as usize..];
                Token::Property(prop)
            }
            b'I' => {
                let (ind, ind_len) = varint::read_varu64(&self.0[1..]);
                self.0 = &self.0[1 + ind_len..];
                Token::Index(ind as usize)
            }
            c => panic!("unexpected pointer tape control byte {c:?}"),
        })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn escape(s: &str) -> String {
            s.replace('~', "~0").replace('/', "~1")
        }
        for token in self.iter() {
            write!(f, "/")?;
            match token {
                Token::NextIndex => write!(f, "-")?,
                Token::Property(p) => write!(f, "{}", escape(p))?,
                Token::Index(ind) => write!(f, "{ind}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
