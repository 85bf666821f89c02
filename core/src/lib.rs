//! Synchronous client core for the RetroAchievements `dorequest.php` API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses reply bodies without touching the
//! network (host-does-IO pattern). The caller executes the HTTP round-trip,
//! which keeps the core deterministic and testable.
//!
//! # Design
//! - A `Session` is an immutable credential value passed explicitly to
//!   every authenticated builder; there is no ambient state.
//! - Each operation is split into `build_*` (produces a request) and
//!   `parse_*` (classifies the reply), so the I/O boundary is explicit.
//! - Replies classify into `Response::Success`, `Response::Error` or
//!   `Response::Empty`. Service rejections are data, not `Err`.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod session;
pub mod signature;
pub mod types;

pub use error::ApiError;
pub use http::{FormPart, HttpMethod, HttpRequest, Multipart};
pub use request::{
    build_award_achievement, build_award_achievements, build_login, build_login_with_token,
    build_ping, build_start_session,
};
pub use response::{
    parse_award_achievement, parse_award_achievements, parse_body, parse_login, parse_ping,
    parse_start_session,
};
pub use session::Session;
pub use types::{
    AchievementInfo, AwardAchievement, AwardAchievementError, AwardAchievements, GameInfo, Login,
    Ping, Rejection, Response, ResponseKind, ServiceError, StartSession, Unlock,
};
