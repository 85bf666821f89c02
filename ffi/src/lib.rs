//! C-ABI wrapper around `ra-core`.
//!
//! # Overview
//! Exposes request building and reply parsing for every `dorequest.php`
//! operation through `extern "C"` functions, so a game or mod runtime with a
//! C FFI can drive the client without linking serde or an HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `ra_build_*` / `ra_parse_*` mirrors the core API 1:1.
//!   Builders return null for a null or non-UTF-8 argument and when the
//!   core rejects the input.
//! - A single `FfiResult` envelope with `FfiStatus` + `FfiDataTag` + `void*
//!   data` conveys the success / error / empty classification uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `ra_*_free` / `ra_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use ra_core::{ApiError, Rejection, Response};

use types::*;

/// Borrow a C string argument. Null and invalid UTF-8 both yield `None`, so
/// the caller gets a null result instead of a request built from altered text.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a session context. `game_id` 0 means no game selected.
///
/// Returns null if any string argument is null or if an internal panic
/// occurs. The caller must free the returned pointer with `ra_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ra_session_new(
    host: *const c_char,
    username: *const c_char,
    token: *const c_char,
    hardcore: bool,
    game_id: u32,
) -> *mut FfiSession {
    catch_unwind(|| {
        let (Some(host), Some(username), Some(token)) =
            (unsafe { str_arg(host) }, unsafe { str_arg(username) }, unsafe {
                str_arg(token)
            })
        else {
            return std::ptr::null_mut();
        };
        let mut session = ra_core::Session::new(host, username, token).with_hardcore(hardcore);
        if game_id != 0 {
            session = session.for_game(game_id);
        }
        Box::into_raw(Box::new(FfiSession { inner: session }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `ra_session_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ra_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(session) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run a session-based builder, mapping null handles and validation
/// failures to a null request.
fn build_with_session(
    session: *const FfiSession,
    build: impl FnOnce(&ra_core::Session) -> Result<ra_core::HttpRequest, ApiError>,
) -> *mut FfiHttpRequest {
    if session.is_null() {
        return std::ptr::null_mut();
    }
    let session = unsafe { &*session };
    match build(&session.inner) {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Build a password login request.
///
/// Returns null if an argument is null or empty.
/// The caller must free the returned pointer with `ra_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_login(
    host: *const c_char,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(host), Some(username), Some(password)) =
            (unsafe { str_arg(host) }, unsafe { str_arg(username) }, unsafe {
                str_arg(password)
            })
        else {
            return std::ptr::null_mut();
        };
        match ra_core::build_login(host, username, password) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a token login request for an existing session.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_login_with_token(session: *const FfiSession) -> *mut FfiHttpRequest {
    catch_unwind(|| build_with_session(session, ra_core::build_login_with_token))
        .unwrap_or(std::ptr::null_mut())
}

/// Build a start-session request. The session must have a game selected.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_start_session(session: *const FfiSession) -> *mut FfiHttpRequest {
    catch_unwind(|| build_with_session(session, ra_core::build_start_session))
        .unwrap_or(std::ptr::null_mut())
}

/// Build a rich-presence ping. `message` is sent as form part `m`.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_ping(
    session: *const FfiSession,
    message: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(message) = (unsafe { str_arg(message) }) else {
            return std::ptr::null_mut();
        };
        build_with_session(session, |s| ra_core::build_ping(s, message))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed single-award request.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_award_achievement(
    session: *const FfiSession,
    achievement_id: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        build_with_session(session, |s| {
            ra_core::build_award_achievement(s, achievement_id)
        })
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed batch-award request for `ids_len` ids starting at `ids`.
///
/// Returns null if `ids` is null or `ids_len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn ra_build_award_achievements(
    session: *const FfiSession,
    ids: *const u32,
    ids_len: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if ids.is_null() {
            return std::ptr::null_mut();
        }
        let ids = unsafe { std::slice::from_raw_parts(ids, ids_len as usize) };
        build_with_session(session, |s| ra_core::build_award_achievements(s, ids))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Read a reply body. A null pointer is a `NullArg` result; bytes that are
/// not UTF-8 cannot be JSON and fail as `Deserialization`.
fn body_arg(body: *const c_char) -> Result<String, *mut FfiResult> {
    if body.is_null() {
        return Err(FfiResult::null_arg("body"));
    }
    match unsafe { CStr::from_ptr(body) }.to_str() {
        Ok(body) => Ok(body.to_owned()),
        Err(e) => Err(FfiResult::from_error(ApiError::DeserializationError(
            format!("body is not UTF-8: {e}"),
        ))),
    }
}

/// Map a classified reply onto the `FfiResult` envelope. `rejected_data`
/// supplies the payload, if any, that accompanies a service rejection.
fn to_ffi_result<T, E: Rejection>(
    parsed: Result<Response<T, E>, ApiError>,
    tag: FfiDataTag,
    success_data: impl FnOnce(T) -> *mut c_void,
    rejected_data: impl FnOnce(&E) -> Option<*mut c_void>,
) -> *mut FfiResult {
    match parsed {
        Ok(Response::Success(payload)) => FfiResult::success(tag, success_data(payload)),
        Ok(Response::Error(err)) => match rejected_data(&err) {
            Some(data) => FfiResult::rejected(err.service_error(), tag, data),
            None => FfiResult::rejected(err.service_error(), FfiDataTag::None, std::ptr::null_mut()),
        },
        Ok(Response::Empty) => FfiResult::empty(),
        Err(e) => FfiResult::from_error(e),
    }
}

/// Parse a login reply.
///
/// Returns a result with `data_tag = Login` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ra_parse_login(body: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let body = match body_arg(body) {
            Ok(body) => body,
            Err(result) => return result,
        };
        to_ffi_result(
            ra_core::parse_login(&body),
            FfiDataTag::Login,
            |l| into_data(FfiLogin::from(l)),
            |_| None,
        )
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ra_parse_login"))
}

/// Parse a start-session reply.
///
/// Returns a result with `data_tag = StartSession` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ra_parse_start_session(body: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let body = match body_arg(body) {
            Ok(body) => body,
            Err(result) => return result,
        };
        to_ffi_result(
            ra_core::parse_start_session(&body),
            FfiDataTag::StartSession,
            |s| into_data(FfiStartSession::from(s)),
            |_| None,
        )
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ra_parse_start_session"))
}

/// Parse a ping reply. Success carries no payload.
#[unsafe(no_mangle)]
pub extern "C" fn ra_parse_ping(body: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let body = match body_arg(body) {
            Ok(body) => body,
            Err(result) => return result,
        };
        to_ffi_result(
            ra_core::parse_ping(&body),
            FfiDataTag::None,
            |_| std::ptr::null_mut(),
            |_| None,
        )
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ra_parse_ping"))
}

/// Parse a single-award reply.
///
/// `data_tag = AwardAchievement` on success and on rejection, since the
/// service echoes the achievement id and scores either way.
#[unsafe(no_mangle)]
pub extern "C" fn ra_parse_award_achievement(body: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let body = match body_arg(body) {
            Ok(body) => body,
            Err(result) => return result,
        };
        to_ffi_result(
            ra_core::parse_award_achievement(&body),
            FfiDataTag::AwardAchievement,
            |a| into_data(FfiAwardAchievement::from(a)),
            |e| Some(into_data(FfiAwardAchievement::from(e))),
        )
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ra_parse_award_achievement"))
}

/// Parse a batch-award reply.
///
/// Returns a result with `data_tag = AwardAchievements` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ra_parse_award_achievements(body: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let body = match body_arg(body) {
            Ok(body) => body,
            Err(result) => return result,
        };
        to_ffi_result(
            ra_core::parse_award_achievements(&body),
            FfiDataTag::AwardAchievements,
            |a| into_data(FfiAwardAchievements::from(a)),
            |_| None,
        )
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ra_parse_award_achievements"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `ra_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ra_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.content_type);
        free_c_string(req.body);
        for part in unsafe { from_raw_slice(req.parts, req.parts_len) }.iter() {
            free_c_string(part.name);
            free_c_string(part.value);
        }
    });
}

/// Free an `FfiResult` returned by any `ra_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn ra_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.error_code);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Login => {
                let login = unsafe { Box::from_raw(result.data as *mut FfiLogin) };
                free_c_string(login.user);
                free_c_string(login.token);
                free_c_string(login.account_type);
            }
            FfiDataTag::StartSession => {
                let s = unsafe { Box::from_raw(result.data as *mut FfiStartSession) };
                drop(unsafe { from_raw_slice(s.hardcore_unlocks, s.hardcore_unlocks_len) });
                drop(unsafe { from_raw_slice(s.unlocks, s.unlocks_len) });
            }
            FfiDataTag::AwardAchievement => {
                drop(unsafe { Box::from_raw(result.data as *mut FfiAwardAchievement) });
            }
            FfiDataTag::AwardAchievements => {
                let a = unsafe { Box::from_raw(result.data as *mut FfiAwardAchievements) };
                drop(unsafe { from_raw_slice(a.existing_ids, a.existing_ids_len) });
                drop(unsafe { from_raw_slice(a.successful_ids, a.successful_ids_len) });
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ra_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
