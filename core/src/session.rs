//! Credential/session context shared by every authenticated request.
//!
//! A `Session` is never mutated. Switching game or scoring mode produces a
//! new value, so a context can be shared by reference across threads and
//! every `build_*` call sees exactly the inputs it was given.

use std::fmt;

use crate::types::Login;

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    host: String,
    username: String,
    token: String,
    hardcore: bool,
    game_id: Option<u32>,
}

impl Session {
    /// Softcore context with no game selected.
    pub fn new(host: &str, username: &str, token: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            token: token.to_string(),
            hardcore: false,
            game_id: None,
        }
    }

    /// Context for the account returned by a successful login.
    pub fn from_login(host: &str, login: &Login) -> Self {
        Self::new(host, &login.user, &login.token)
    }

    pub fn with_hardcore(&self, hardcore: bool) -> Self {
        Self {
            hardcore,
            ..self.clone()
        }
    }

    pub fn for_game(&self, game_id: u32) -> Self {
        Self {
            game_id: Some(game_id),
            ..self.clone()
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn hardcore(&self) -> bool {
        self.hardcore
    }

    pub fn game_id(&self) -> Option<u32> {
        self.game_id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("hardcore", &self.hardcore)
            .field("game_id", &self.game_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("retroachievements.org", "TimmoneSimmons", "0123456789abcdef")
    }

    #[test]
    fn derivations_leave_original_untouched() {
        let base = session();
        let hc = base.with_hardcore(true).for_game(32123);

        assert!(!base.hardcore());
        assert_eq!(base.game_id(), None);
        assert!(hc.hardcore());
        assert_eq!(hc.game_id(), Some(32123));
        assert_eq!(hc.username(), "TimmoneSimmons");
        assert_eq!(hc.token(), "0123456789abcdef");
    }

    #[test]
    fn from_login_copies_user_and_token() {
        let login = Login {
            user: "TimmoneSimmons".to_string(),
            token: "fedcba9876543210".to_string(),
            ..Login::default()
        };
        let s = Session::from_login("retroachievements.org", &login);
        assert_eq!(s.host(), "retroachievements.org");
        assert_eq!(s.username(), "TimmoneSimmons");
        assert_eq!(s.token(), "fedcba9876543210");
    }

    #[test]
    fn debug_redacts_token() {
        let out = format!("{:?}", session());
        assert!(out.contains("TimmoneSimmons"));
        assert!(!out.contains("0123456789abcdef"));
    }
}
