//! The stable status enumeration and the fallible-operation error type that
//! maps onto it.

/// Stable, ordinal-significant status code returned across the ABI boundary.
/// `Ok` is always ordinal 0; the rest of the ordering is not itself part of
/// the contract, but the *set* and the *names* are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum Status {
    Ok = 0,
    Utf8ParseError,
    JsonParseError,
    UuidBadLocation,
    UuidNotAString,
    UuidParseError,
    JsonPtrNotRooted,
}

impl Status {
    /// Render a short, stable, ASCII human description, suitable for
    /// inclusion in a host-level error message. This is deliberately just
    /// the enum's `Debug` form: short, stable, and free of punctuation that
    /// would need escaping.
    pub fn description(self) -> String {
        format!("{self:?}")
    }
}

/// Errors produced by document construction, ingest, and mutation. Each
/// variant maps 1:1 onto a [`Status`] other than `Ok`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("document bytes are not well-formed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UUID location is structurally incompatible with the document")]
    UuidBadLocation,

    #[error("UUID location holds a JSON value that is neither string nor null")]
    UuidNotAString,

    #[error("UUID location holds a string that is not a valid UUID")]
    UuidParseError,

    #[error(transparent)]
    JsonPtr(#[from] vellum_ptr::Error),
}

impl From<&Error> for Status {
    fn from(err: &Error) -> Status {
        match err {
            Error::Json(_) => Status::JsonParseError,
            Error::UuidBadLocation => Status::UuidBadLocation,
            Error::UuidNotAString => Status::UuidNotAString,
            Error::UuidParseError => Status::UuidParseError,
            Error::JsonPtr(vellum_ptr::Error::NotRooted) => Status::JsonPtrNotRooted,
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Status {
        Status::from(&err)
    }
}
