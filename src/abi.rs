//! Purpose: C ABI bridge for hosts that load `libvarstore` dynamically.
//! Exports: `init`, `shutdown`, `make`, `mod`, `remove`, `get_type`, `get_value_as_string`,
//! `get_mutability`, `count`, `last_error_message` (unmangled symbols).
//! Role: Decodes NUL-terminated UTF-8 inputs, delegates to `Store`, encodes outcomes as `int`.
//! Invariants: Non-negative return means success; negative values are `to_abi_code` kinds.
//! Invariants: One process-wide session guarded by a single mutex; held for the whole call.
//! Invariants: No pointer into the store escapes; output is copied into caller buffers.
//! Invariants: Failed buffer writes leave an empty NUL-terminated string when capacity > 0.
//! Notes: Pointer arguments must be null or point to memory valid for the whole call.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use crate::core::error::{Error, ErrorKind, to_abi_code};
use crate::core::render::render;
use crate::core::store::Store;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

struct Session {
    store: Store,
    last_error: Option<String>,
}

impl Session {
    fn new() -> Self {
        Self {
            store: Store::new(),
            last_error: None,
        }
    }
}

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Installs a fresh, empty store. Returns 0, or `AlreadyInitialized` when a session is live.
#[unsafe(no_mangle)]
pub extern "C" fn init() -> i32 {
    let mut guard = match lock_session() {
        Ok(guard) => guard,
        Err(err) => return encode_unrecorded(err),
    };
    if let Some(session) = guard.as_mut() {
        let err = Error::new(ErrorKind::AlreadyInitialized)
            .with_message("init called while a session is active")
            .with_hint("Call shutdown before init.");
        return encode(session, "init", Err::<i32, _>(err));
    }
    *guard = Some(Session::new());
    debug!("session initialized");
    0
}

/// Releases the store and every variable. Calling it without a live session is a no-op.
#[unsafe(no_mangle)]
pub extern "C" fn shutdown() {
    let mut guard = match SESSION.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            SESSION.clear_poison();
            poisoned.into_inner()
        }
    };
    if let Some(session) = guard.take() {
        debug!(variables = session.store.len(), "session shut down");
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn make(
    name: *const c_char,
    mutability: *const c_char,
    value_type: *const c_char,
    literal: *const c_char,
) -> i32 {
    with_session("make", |session| {
        let name = read_str(name, "name")?;
        let mutability = read_str(mutability, "mutability")?;
        let value_type = read_str(value_type, "type")?;
        let literal = read_str(literal, "literal")?;
        session
            .store
            .create_from_tags(name, mutability, value_type, literal)?;
        Ok(0)
    })
}

/// Exported as `mod`.
#[unsafe(export_name = "mod")]
pub extern "C" fn modify(
    name: *const c_char,
    value_type: *const c_char,
    literal: *const c_char,
) -> i32 {
    with_session("mod", |session| {
        let name = read_str(name, "name")?;
        let value_type = read_str(value_type, "type")?;
        let literal = read_str(literal, "literal")?;
        session.store.modify_from_tags(name, value_type, literal)?;
        Ok(0)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn remove(name: *const c_char) -> i32 {
    with_session("remove", |session| {
        let name = read_str(name, "name")?;
        session.store.remove(name)?;
        Ok(0)
    })
}

/// Returns the type tag (0=number .. 5=null) of the named variable.
#[unsafe(no_mangle)]
pub extern "C" fn get_type(name: *const c_char) -> i32 {
    with_session("get_type", |session| {
        let name = read_str(name, "name")?;
        Ok(session.store.get_type(name)?.code())
    })
}

/// Returns 0 for const and 1 for dynamic variables.
#[unsafe(no_mangle)]
pub extern "C" fn get_mutability(name: *const c_char) -> i32 {
    with_session("get_mutability", |session| {
        let name = read_str(name, "name")?;
        Ok(session.store.mutability(name)?.code())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn count() -> i32 {
    with_session("count", |session| {
        i32::try_from(session.store.len())
            .map_err(|err| Error::new(ErrorKind::Internal).with_source(err))
    })
}

/// Renders the named variable into `buffer` and returns the number of bytes written,
/// excluding the NUL terminator.
#[unsafe(no_mangle)]
pub extern "C" fn get_value_as_string(
    name: *const c_char,
    buffer: *mut c_char,
    capacity: usize,
) -> i32 {
    let code = with_session("get_value_as_string", |session| {
        let name = read_str(name, "name")?;
        let text = render(session.store.get(name)?);
        write_buffer(&text, buffer, capacity).map_err(|err| err.with_name(name))
    });
    if code < 0 {
        clear_buffer(buffer, capacity);
    }
    code
}

/// Copies the message of the most recent failed call (empty after a success) into `buffer`.
/// Reading the message does not reset it.
#[unsafe(no_mangle)]
pub extern "C" fn last_error_message(buffer: *mut c_char, capacity: usize) -> i32 {
    let result = lock_session().and_then(|guard| match guard.as_ref() {
        Some(session) => write_buffer(
            session.last_error.as_deref().unwrap_or(""),
            buffer,
            capacity,
        ),
        None => Err(not_initialized()),
    });
    match result {
        Ok(written) => written,
        Err(err) => {
            clear_buffer(buffer, capacity);
            to_abi_code(err.kind())
        }
    }
}

fn with_session<F>(op: &'static str, f: F) -> i32
where
    F: FnOnce(&mut Session) -> Result<i32, Error>,
{
    let mut guard = match lock_session() {
        Ok(guard) => guard,
        Err(err) => return encode_unrecorded(err),
    };
    let Some(session) = guard.as_mut() else {
        debug!(op, "call rejected: not initialized");
        return to_abi_code(ErrorKind::NotInitialized);
    };
    let result = f(session);
    encode(session, op, result)
}

fn encode(session: &mut Session, op: &'static str, result: Result<i32, Error>) -> i32 {
    match result {
        Ok(code) => {
            session.last_error = None;
            code
        }
        Err(err) => {
            debug!(op, kind = err.kind().as_str(), variable = err.name(), "call failed");
            let code = to_abi_code(err.kind());
            session.last_error = Some(err.to_string());
            code
        }
    }
}

fn encode_unrecorded(err: Error) -> i32 {
    warn!(kind = err.kind().as_str(), "{err}");
    to_abi_code(err.kind())
}

fn lock_session() -> Result<MutexGuard<'static, Option<Session>>, Error> {
    SESSION.lock().map_err(|_| {
        Error::new(ErrorKind::Internal)
            .with_message("session lock poisoned")
            .with_hint("Call shutdown to reset the session.")
    })
}

fn not_initialized() -> Error {
    Error::new(ErrorKind::NotInitialized).with_message("init has not been called")
}

fn read_str<'a>(input: *const c_char, what: &str) -> Result<&'a str, Error> {
    if input.is_null() {
        return Err(Error::new(ErrorKind::InvalidArgument).with_message(format!("{what} is null")));
    }
    unsafe { CStr::from_ptr(input) }.to_str().map_err(|err| {
        Error::new(ErrorKind::InvalidArgument)
            .with_message(format!("{what} is not valid UTF-8"))
            .with_source(err)
    })
}

fn write_buffer(text: &str, buffer: *mut c_char, capacity: usize) -> Result<i32, Error> {
    if buffer.is_null() {
        return Err(Error::new(ErrorKind::InvalidArgument).with_message("buffer is null"));
    }
    let bytes = text.as_bytes();
    let written = i32::try_from(bytes.len()).map_err(|err| {
        Error::new(ErrorKind::BufferTooSmall)
            .with_message("rendered value exceeds the int return range")
            .with_source(err)
    })?;
    if bytes.len() >= capacity {
        return Err(Error::new(ErrorKind::BufferTooSmall).with_message(format!(
            "rendered value needs {} bytes, buffer holds {capacity}",
            bytes.len() + 1
        )));
    }
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), buffer.cast::<u8>(), bytes.len());
        *buffer.add(bytes.len()) = 0;
    }
    Ok(written)
}

fn clear_buffer(buffer: *mut c_char, capacity: usize) {
    if buffer.is_null() || capacity == 0 {
        return;
    }
    unsafe {
        *buffer = 0;
    }
}
