//! Domain DTOs for `dorequest.php` replies.
//!
//! # Design
//! Field names on the wire are PascalCase and case-sensitive, with a few
//! irregular spellings (`ID`, `AchievementID`, `ExistingIDs`) renamed
//! explicitly. Every payload struct is `#[serde(default)]`: the service
//! omits fields freely, and a missing field should read as zero or empty
//! rather than fail the whole reply.

use serde::{Deserialize, Serialize};

/// Which of the three classifications a reply fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Success,
    Error,
    Empty,
}

/// A classified reply. Exactly one variant holds.
///
/// `E` is the rejection payload. Most operations use the plain
/// [`ServiceError`]; single awards echo extra fields on rejection and use
/// [`AwardAchievementError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T, E = ServiceError> {
    /// `"Success": true`.
    Success(T),
    /// The service answered and refused.
    Error(E),
    /// Nothing parseable came back: a blank body or `{}`.
    Empty,
}

impl<T, E> Response<T, E> {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Success(_) => ResponseKind::Success,
            Response::Error(_) => ResponseKind::Error,
            Response::Empty => ResponseKind::Empty,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Response::Success(t) => Some(t),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Response::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Uniform view of a rejection, whatever extra fields an operation echoes.
pub trait Rejection {
    fn service_error(&self) -> &ServiceError;
}

/// Rejection payload shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceError {
    /// Human-readable message (`Error`).
    #[serde(rename = "Error")]
    pub message: String,
    /// Machine-readable code, e.g. `invalid_credentials`.
    #[serde(rename = "Code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// HTTP-equivalent status, e.g. 401.
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Rejection for ServiceError {
    fn service_error(&self) -> &ServiceError {
        self
    }
}

/// `login2` success payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Login {
    pub user: String,
    pub token: String,
    pub score: u32,
    pub softcore_score: u32,
    /// Unread message count.
    pub messages: u32,
    /// Permission level; negative values mark restricted accounts.
    pub permissions: i32,
    pub account_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// One unlock record: which achievement, and when (unix seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unlock {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "When")]
    pub when: i64,
}

/// `startsession` success payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StartSession {
    pub hardcore_unlocks: Vec<Unlock>,
    /// Softcore unlocks.
    pub unlocks: Vec<Unlock>,
    /// Server clock (unix seconds) at the time of the reply.
    pub server_now: i64,
}

impl StartSession {
    /// Hardcore unlock ids in reply order.
    pub fn hardcore_unlock_ids(&self) -> Vec<u32> {
        self.hardcore_unlocks.iter().map(|u| u.id).collect()
    }

    /// Softcore unlock ids in reply order.
    pub fn unlock_ids(&self) -> Vec<u32> {
        self.unlocks.iter().map(|u| u.id).collect()
    }
}

/// `ping` success payload. The service sends nothing beyond `Success`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {}

/// `awardachievement` success payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AwardAchievement {
    pub achievements_remaining: u32,
    pub score: u32,
    pub softcore_score: u32,
    #[serde(rename = "AchievementID")]
    pub achievement_id: u32,
}

/// `awardachievement` rejection. The service echoes the processed id and the
/// current scores even when it refuses the unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AwardAchievementError {
    #[serde(flatten)]
    pub error: ServiceError,
    pub achievements_remaining: Option<u32>,
    pub score: Option<u32>,
    pub softcore_score: Option<u32>,
    #[serde(rename = "AchievementID")]
    pub achievement_id: Option<u32>,
}

impl Rejection for AwardAchievementError {
    fn service_error(&self) -> &ServiceError {
        &self.error
    }
}

/// `awardachievements` success payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AwardAchievements {
    pub score: u32,
    pub softcore_score: u32,
    /// Already unlocked before this call; the server did nothing for them.
    #[serde(rename = "ExistingIDs")]
    pub existing_ids: Vec<u32>,
    /// Unlocked by this call.
    #[serde(rename = "SuccessfulIDs")]
    pub successful_ids: Vec<u32>,
}

/// Game metadata as published alongside an achievement set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GameInfo {
    pub id: u32,
    pub name: String,
}

/// Achievement metadata as published alongside an achievement set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AchievementInfo {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub points: u32,
    /// Progression tag (`progression`, `win_condition`, `missable`) or empty.
    #[serde(rename = "Type")]
    pub kind: String,
    pub category: u32,
    pub badge: String,
    /// Id of the achievement set this entry belongs to.
    pub set: u32,
}

impl AchievementInfo {
    const CATEGORY_CORE: u32 = 5;
    const CATEGORY_UNOFFICIAL: u32 = 3;

    pub fn is_core(&self) -> bool {
        self.category == Self::CATEGORY_CORE
    }

    /// The service refuses to award unofficial achievements.
    pub fn is_unofficial(&self) -> bool {
        self.category == Self::CATEGORY_UNOFFICIAL
    }
}
