//! The stable C ABI: the only unsafe surface in this workspace. Every
//! handle here is a `Box`-allocated value the host receives as an opaque
//! pointer and must release through its matching `_drop` call; nothing
//! defined here keeps a reference to caller memory past the call that
//! received it.

use libc::c_char;
use std::ffi::CStr;
use std::slice;

/// Opaque handle wrapping a parsed [`vellum_ptr::Pointer`].
pub struct VellumPtr(vellum_ptr::Pointer);

/// A 128-bit UUID, passed by value across the ABI.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VellumUuid {
    pub bytes: [u8; 16],
}

/// Copy `bytes` into the caller's `(out, out_cap)` buffer, truncating if
/// necessary, and return the number of bytes that *would* have been
/// written — the short-return protocol used by every output-producing call
/// in this ABI.
unsafe fn write_short_return(bytes: &[u8], out: *mut u8, out_cap: usize) -> usize {
    if !out.is_null() && out_cap > 0 {
        let copy_len = bytes.len().min(out_cap);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), out, copy_len);
    }
    bytes.len()
}

/// Render `status` to a short, stable, ASCII description.
#[no_mangle]
pub unsafe extern "C" fn vellum_status_description(
    status: vellum_doc::Status,
    out: *mut u8,
    out_cap: usize,
) -> usize {
    write_short_return(status.description().as_bytes(), out, out_cap)
}

/// Parse a nul-terminated, UTF-8 JSON Pointer string. On success, writes a
/// freshly owned handle to `*out`.
#[no_mangle]
pub unsafe extern "C" fn vellum_json_ptr_new(
    ptr_cstr: *const c_char,
    out: *mut *mut VellumPtr,
) -> vellum_doc::Status {
    debug_assert!(!ptr_cstr.is_null());
    debug_assert!(!out.is_null());

    *out = std::ptr::null_mut();

    let s = match CStr::from_ptr(ptr_cstr).to_str() {
        Ok(s) => s,
        Err(_) => return vellum_doc::Status::Utf8ParseError,
    };

    match vellum_ptr::Pointer::try_from(s) {
        Ok(p) => {
            *out = Box::into_raw(Box::new(VellumPtr(p)));
            vellum_doc::Status::Ok
        }
        Err(vellum_ptr::Error::NotRooted) => vellum_doc::Status::JsonPtrNotRooted,
    }
}

/// Release a pointer handle. No-op on a null handle.
#[no_mangle]
pub unsafe extern "C" fn vellum_json_ptr_drop(ptr: *mut VellumPtr) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Build an empty document rooted at `ptr`'s UUID location.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_new(ptr: *const VellumPtr) -> *mut vellum_doc::Document {
    debug_assert!(!ptr.is_null());
    Box::into_raw(Box::new(vellum_doc::Document::new((*ptr).0.clone())))
}

/// Build an acknowledgement document sharing `msg`'s UUID location.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_new_acknowledgement(
    msg: *const vellum_doc::Document,
) -> *mut vellum_doc::Document {
    debug_assert!(!msg.is_null());
    Box::into_raw(Box::new((*msg).new_acknowledgement()))
}

/// Ingest JSON bytes into `msg`, validating the UUID location. On error the
/// document is left unchanged.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_unmarshal_json(
    msg: *mut vellum_doc::Document,
    buf: *const u8,
    buf_len: usize,
) -> vellum_doc::Status {
    debug_assert!(!msg.is_null());
    let bytes = if buf_len == 0 {
        &[][..]
    } else {
        debug_assert!(!buf.is_null());
        slice::from_raw_parts(buf, buf_len)
    };

    match (*msg).ingest(bytes) {
        Ok(()) => vellum_doc::Status::Ok,
        Err(e) => vellum_doc::Status::from(&e),
    }
}

/// Read the UUID at `msg`'s declared location (all zeros if absent/null).
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_get_uuid(msg: *const vellum_doc::Document) -> VellumUuid {
    debug_assert!(!msg.is_null());
    VellumUuid {
        bytes: (*msg).get_uuid(),
    }
}

/// Write `uuid` at `msg`'s declared UUID location.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_set_uuid(msg: *mut vellum_doc::Document, uuid: VellumUuid) {
    debug_assert!(!msg.is_null());
    (*msg).set_uuid(uuid.bytes);
}

/// Serialize `msg` as compact JSON terminated by `\n` into `(buf, buf_cap)`;
/// returns the required length.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_marshal_json(
    msg: *const vellum_doc::Document,
    buf: *mut u8,
    buf_cap: usize,
) -> usize {
    debug_assert!(!msg.is_null());
    write_short_return(&(*msg).marshal_json(), buf, buf_cap)
}

const KIND_DOES_NOT_EXIST: u8 = 0;
const KIND_NULL: u8 = 1;
const KIND_TRUE: u8 = 2;
const KIND_FALSE: u8 = 3;
const KIND_UNSIGNED: u8 = 4;
const KIND_SIGNED: u8 = 5;
const KIND_FLOAT: u8 = 6;
const KIND_STRING: u8 = 7;
const KIND_OBJECT: u8 = 8;
const KIND_ARRAY: u8 = 9;

/// One extraction descriptor: `ptr` is the input (which pointer to read);
/// every other field is written by [`vellum_msg_extract_fields`].
#[repr(C)]
pub struct VellumField {
    pub ptr: *const VellumPtr,
    pub kind: u8,
    pub u_val: u64,
    pub i_val: i64,
    pub f_val: f64,
    pub begin: usize,
    pub end: usize,
}

fn fill(ptr: *const VellumPtr, kind: vellum_doc::ValueKind) -> VellumField {
    use vellum_doc::ValueKind::*;

    let mut out = VellumField {
        ptr,
        kind: KIND_DOES_NOT_EXIST,
        u_val: 0,
        i_val: 0,
        f_val: 0.0,
        begin: 0,
        end: 0,
    };
    match kind {
        DoesNotExist => {}
        Null => out.kind = KIND_NULL,
        True => out.kind = KIND_TRUE,
        False => out.kind = KIND_FALSE,
        Unsigned(u) => {
            out.kind = KIND_UNSIGNED;
            out.u_val = u;
        }
        Signed(i) => {
            out.kind = KIND_SIGNED;
            out.i_val = i;
        }
        Float(f) => {
            out.kind = KIND_FLOAT;
            out.f_val = f;
        }
        String(r) => {
            out.kind = KIND_STRING;
            out.begin = r.start;
            out.end = r.end;
        }
        Object(r) => {
            out.kind = KIND_OBJECT;
            out.begin = r.start;
            out.end = r.end;
        }
        Array(r) => {
            out.kind = KIND_ARRAY;
            out.begin = r.start;
            out.end = r.end;
        }
    }
    out
}

/// Batch-extract the value at each `fields[i].ptr`, filling the rest of
/// that descriptor in place, and copy string/object/array payload bytes
/// into `(buf, buf_cap)`. Returns the required buffer length.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_extract_fields(
    msg: *const vellum_doc::Document,
    fields: *mut VellumField,
    fields_len: usize,
    buf: *mut u8,
    buf_cap: usize,
) -> usize {
    debug_assert!(!msg.is_null());
    let field_slice = if fields_len == 0 {
        &mut [][..]
    } else {
        debug_assert!(!fields.is_null());
        slice::from_raw_parts_mut(fields, fields_len)
    };

    let ptrs: Vec<vellum_ptr::Pointer> = field_slice
        .iter()
        .map(|f| {
            debug_assert!(!f.ptr.is_null());
            (*f.ptr).0.clone()
        })
        .collect();

    let (kinds, bytes) = (*msg).extract_fields(&ptrs);
    for (field, kind) in field_slice.iter_mut().zip(kinds.into_iter()) {
        *field = fill(field.ptr, kind);
    }

    write_short_return(&bytes, buf, buf_cap)
}

/// The combined deep hash of `msg` over `ptrs`, in order.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_hash_fields(
    msg: *const vellum_doc::Document,
    ptrs: *const *const VellumPtr,
    ptrs_len: usize,
) -> u64 {
    debug_assert!(!msg.is_null());
    let ptr_slice = if ptrs_len == 0 {
        &[][..]
    } else {
        debug_assert!(!ptrs.is_null());
        slice::from_raw_parts(ptrs, ptrs_len)
    };

    let owned: Vec<vellum_ptr::Pointer> = ptr_slice
        .iter()
        .map(|p| {
            debug_assert!(!p.is_null());
            (**p).0.clone()
        })
        .collect();

    (*msg).hash_fields(&owned)
}

/// Release a document handle. No-op on a null handle.
#[no_mangle]
pub unsafe extern "C" fn vellum_msg_drop(msg: *mut vellum_doc::Document) {
    if !msg.is_null() {
        drop(Box::from_raw(msg));
    }
}

/// Build a shuffle instance from a JSON-encoded configuration (see
/// `vellum_shuffle::Config::from_json`). On success writes the handle to
/// `*out` and returns `0`. On failure, `*out` is left null and the return
/// value is the length the rendered error description would require,
/// copied into `(err_buf, err_cap)` per the usual short-return protocol.
#[no_mangle]
pub unsafe extern "C" fn vellum_shuffle_new(
    config_json: *const u8,
    config_len: usize,
    out: *mut *mut vellum_shuffle::Shuffle,
    err_buf: *mut u8,
    err_cap: usize,
) -> usize {
    debug_assert!(!out.is_null());
    let bytes = if config_len == 0 {
        &[][..]
    } else {
        debug_assert!(!config_json.is_null());
        slice::from_raw_parts(config_json, config_len)
    };

    match vellum_shuffle::Config::from_json(bytes) {
        Ok(config) => {
            *out = Box::into_raw(Box::new(vellum_shuffle::Shuffle::new(config)));
            0
        }
        Err(err) => {
            *out = std::ptr::null_mut();
            write_short_return(err.to_string().as_bytes(), err_buf, err_cap)
        }
    }
}

/// Route `(hash, clock)` to processor indices, writing up to `out_cap`
/// entries into `out` and returning the number of entries the full result
/// contains.
#[no_mangle]
pub unsafe extern "C" fn vellum_shuffle_pick(
    handle: *const vellum_shuffle::Shuffle,
    hash: u32,
    clock: u64,
    out: *mut usize,
    out_cap: usize,
) -> usize {
    debug_assert!(!handle.is_null());
    let picked = (*handle).pick(hash, clock);
    if !out.is_null() && out_cap > 0 {
        for (slot, idx) in picked.iter().take(out_cap).enumerate() {
            *out.add(slot) = *idx;
        }
    }
    picked.len()
}

/// Release a shuffle handle. No-op on a null handle.
#[no_mangle]
pub unsafe extern "C" fn vellum_shuffle_drop(handle: *mut vellum_shuffle::Shuffle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Install a `tracing-subscriber` `fmt` layer writing to `fd`, filtered at
/// `level` (0=error .. 4=trace). Intended to be called once, at host
/// start-up, so this crate's `tracing` events land in the host's own log
/// stream.
#[no_mangle]
pub unsafe extern "C" fn vellum_log_init(level: libc::c_int, fd: libc::c_int) {
    use std::os::unix::io::FromRawFd;

    let level_filter = match level {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let writer = std::fs::File::from_raw_fd(fd);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level_filter)
        .with_writer(std::sync::Mutex::new(writer))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
