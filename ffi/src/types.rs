//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Arrays are handed out as boxed slices so they can be released with the
//! exact length they were allocated with.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use ra_core::{
    ApiError, AwardAchievement, AwardAchievementError, AwardAchievements, HttpMethod, Login,
    Multipart, ServiceError, StartSession, Unlock,
};

/// Opaque handle to a `Session`. C callers receive a pointer to this and
/// pass it back into every authenticated build function.
pub struct FfiSession {
    pub(crate) inner: ra_core::Session,
}

/// Allocate a C string, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), |s| c_string(s))
}

/// Leak a `Vec` as a boxed slice. Empty vectors become a null pointer.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a slice leaked by `into_raw_slice`.
///
/// # Safety
/// `ptr` and `len` must come from one `into_raw_slice` call, at most once.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    if ptr.is_null() || len == 0 {
        return Box::new([]);
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// One named multipart form part.
#[repr(C)]
pub struct FfiFormPart {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `ra_build_*` functions. `parts` lists the form fields in wire
/// order for callers that encode multipart themselves; `content_type` and
/// `body` hold a ready-made encoding of the same fields. All three are null
/// for `Get` requests.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub parts: *mut FfiFormPart,
    pub parts_len: u32,
    pub content_type: *mut c_char,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: ra_core::HttpRequest) -> *mut Self {
        let (content_type, body) = match &req.form {
            Some(form) => {
                let boundary = Multipart::random_boundary();
                (
                    c_string(Multipart::content_type(&boundary)),
                    c_string(form.encode(&boundary)),
                )
            }
            None => (std::ptr::null_mut(), std::ptr::null_mut()),
        };
        let parts: Vec<FfiFormPart> = req
            .form
            .map(|form| {
                form.parts()
                    .iter()
                    .map(|p| FfiFormPart {
                        name: c_string(p.name.as_str()),
                        value: c_string(p.value.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let (parts, parts_len) = into_raw_slice(parts);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            parts,
            parts_len,
            content_type,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Classification of a parse call.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiStatus {
    Success = 0,
    /// The service refused; see `error_message`, `error_code`, `http_status`.
    Error = 1,
    /// Blank body or `{}`.
    Empty = 2,
    /// The body is not UTF-8 or not a JSON object.
    Deserialization = 3,
    Panic = 4,
    /// A required pointer argument was null.
    NullArg = 5,
}

/// Tag that tells `ra_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Login = 1,
    StartSession = 2,
    AwardAchievement = 3,
    AwardAchievements = 4,
}

#[repr(C)]
pub struct FfiLogin {
    pub user: *mut c_char,
    pub token: *mut c_char,
    pub score: u32,
    pub softcore_score: u32,
    pub messages: u32,
    pub permissions: i32,
    pub account_type: *mut c_char,
}

impl From<Login> for FfiLogin {
    fn from(l: Login) -> Self {
        FfiLogin {
            user: c_string(l.user),
            token: c_string(l.token),
            score: l.score,
            softcore_score: l.softcore_score,
            messages: l.messages,
            permissions: l.permissions,
            account_type: c_string(l.account_type),
        }
    }
}

#[repr(C)]
pub struct FfiUnlock {
    pub id: u32,
    pub when: i64,
}

impl From<Unlock> for FfiUnlock {
    fn from(u: Unlock) -> Self {
        FfiUnlock {
            id: u.id,
            when: u.when,
        }
    }
}

#[repr(C)]
pub struct FfiStartSession {
    pub hardcore_unlocks: *mut FfiUnlock,
    pub hardcore_unlocks_len: u32,
    pub unlocks: *mut FfiUnlock,
    pub unlocks_len: u32,
    pub server_now: i64,
}

impl From<StartSession> for FfiStartSession {
    fn from(s: StartSession) -> Self {
        let (hardcore_unlocks, hardcore_unlocks_len) =
            into_raw_slice(s.hardcore_unlocks.into_iter().map(FfiUnlock::from).collect());
        let (unlocks, unlocks_len) =
            into_raw_slice(s.unlocks.into_iter().map(FfiUnlock::from).collect());
        FfiStartSession {
            hardcore_unlocks,
            hardcore_unlocks_len,
            unlocks,
            unlocks_len,
            server_now: s.server_now,
        }
    }
}

/// Single-award payload. On rejection the echoed fields are filled in and
/// absent ones read as zero.
#[repr(C)]
pub struct FfiAwardAchievement {
    pub achievements_remaining: u32,
    pub score: u32,
    pub softcore_score: u32,
    pub achievement_id: u32,
}

impl From<AwardAchievement> for FfiAwardAchievement {
    fn from(a: AwardAchievement) -> Self {
        FfiAwardAchievement {
            achievements_remaining: a.achievements_remaining,
            score: a.score,
            softcore_score: a.softcore_score,
            achievement_id: a.achievement_id,
        }
    }
}

impl From<&AwardAchievementError> for FfiAwardAchievement {
    fn from(e: &AwardAchievementError) -> Self {
        FfiAwardAchievement {
            achievements_remaining: e.achievements_remaining.unwrap_or_default(),
            score: e.score.unwrap_or_default(),
            softcore_score: e.softcore_score.unwrap_or_default(),
            achievement_id: e.achievement_id.unwrap_or_default(),
        }
    }
}

#[repr(C)]
pub struct FfiAwardAchievements {
    pub score: u32,
    pub softcore_score: u32,
    pub existing_ids: *mut u32,
    pub existing_ids_len: u32,
    pub successful_ids: *mut u32,
    pub successful_ids_len: u32,
}

impl From<AwardAchievements> for FfiAwardAchievements {
    fn from(a: AwardAchievements) -> Self {
        let (existing_ids, existing_ids_len) = into_raw_slice(a.existing_ids);
        let (successful_ids, successful_ids_len) = into_raw_slice(a.successful_ids);
        FfiAwardAchievements {
            score: a.score,
            softcore_score: a.softcore_score,
            existing_ids,
            existing_ids_len,
            successful_ids,
            successful_ids_len,
        }
    }
}

/// Box a payload and erase its type for `FfiResult::data`.
pub(crate) fn into_data<T>(payload: T) -> *mut c_void {
    Box::into_raw(Box::new(payload)) as *mut c_void
}

/// Result envelope for all parse operations.
///
/// `status` gives the classification. On `Error`, `error_message` holds the
/// service's message and `error_code` / `http_status` are set when the
/// service sent them (null / 0 otherwise). On `Deserialization`, `Panic` and
/// `NullArg`, `error_message` describes the local failure. `data` points to
/// the payload named by `data_tag`, or is null.
#[repr(C)]
pub struct FfiResult {
    pub status: FfiStatus,
    pub error_message: *mut c_char,
    pub error_code: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn bare(status: FfiStatus, message: Option<String>) -> Self {
        FfiResult {
            status,
            error_message: c_string_opt(message),
            error_code: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
    }

    fn into_raw(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    pub(crate) fn success(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        FfiResult {
            data_tag,
            data,
            ..Self::bare(FfiStatus::Success, None)
        }
        .into_raw()
    }

    /// A service rejection, optionally carrying echoed payload fields.
    pub(crate) fn rejected(
        err: &ServiceError,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        FfiResult {
            error_code: c_string_opt(err.code.clone()),
            http_status: err.status.unwrap_or_default(),
            data_tag,
            data,
            ..Self::bare(FfiStatus::Error, Some(err.message.clone()))
        }
        .into_raw()
    }

    pub(crate) fn empty() -> *mut Self {
        Self::bare(FfiStatus::Empty, None).into_raw()
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        Self::bare(FfiStatus::Deserialization, Some(err.to_string())).into_raw()
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::bare(FfiStatus::NullArg, Some(format!("null argument: {name}"))).into_raw()
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::bare(FfiStatus::Panic, Some(msg.to_string())).into_raw()
    }
}
