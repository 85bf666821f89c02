//! In-memory emulation of the `dorequest.php` operations.
//!
//! Dispatch is synchronous over `&mut Service` so it can be tested without a
//! router. Hashes are recomputed here independently of the client crate;
//! a drift between the two shows up as a rejected award in the integration
//! tests.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub type Reply = (StatusCode, Json<Value>);

/// Query string and form fields of one request. Form fields win, matching
/// how the real service merges GET and POST input.
#[derive(Debug, Default)]
pub struct Params {
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockRecord {
    pub achievement_id: u32,
    pub hardcore: bool,
    pub when: i64,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub password: String,
    pub token: String,
    pub score: u32,
    pub softcore_score: u32,
    pub messages: u32,
    pub permissions: i32,
    pub account_type: String,
    pub unlocks: Vec<UnlockRecord>,
    /// Last rich-presence text received through `ping`.
    pub presence: Option<String>,
}

impl Account {
    fn unlock(&self, achievement_id: u32) -> Option<&UnlockRecord> {
        self.unlocks.iter().find(|u| u.achievement_id == achievement_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub game_id: u32,
    pub points: u32,
    pub official: bool,
}

#[derive(Debug, Default)]
pub struct Service {
    pub accounts: HashMap<String, Account>,
    pub games: HashMap<u32, String>,
    pub achievements: HashMap<u32, Achievement>,
}

impl Service {
    /// One developer account and one game with four core achievements and
    /// one unofficial achievement.
    pub fn seeded() -> Self {
        let mut service = Service::default();
        service.accounts.insert(
            "TimmoneSimmons".to_string(),
            Account {
                password: "supersecretpass".to_string(),
                token: "0123456789abcdef".to_string(),
                score: 69420,
                softcore_score: 1337,
                messages: 99,
                permissions: 3,
                account_type: "Developer".to_string(),
                unlocks: Vec::new(),
                presence: None,
            },
        );
        service.games.insert(32123, "Terraria".to_string());
        for (id, points, official) in [
            (483244, 5, true),
            (483245, 10, true),
            (483246, 25, true),
            (483247, 1, true),
            (483248, 50, false),
        ] {
            service.achievements.insert(
                id,
                Achievement {
                    game_id: 32123,
                    points,
                    official,
                },
            );
        }
        service
    }

    pub fn presence(&self, user: &str) -> Option<&str> {
        self.accounts.get(user)?.presence.as_deref()
    }

    pub fn dispatch(&mut self, params: &Params) -> Reply {
        match params.get("r").unwrap_or_default() {
            "login2" => self.login(params),
            "startsession" => self.start_session(params),
            "ping" => self.ping(params),
            "awardachievement" => self.award_achievement(params),
            "awardachievements" => self.award_achievements(params),
            other => failure(
                StatusCode::BAD_REQUEST,
                &format!("Unknown Request: '{other}'"),
                None,
            ),
        }
    }

    fn login(&self, params: &Params) -> Reply {
        let user = params.get("u").unwrap_or_default();
        let account = self.accounts.get(user);
        let authorized = match (account, params.get("p"), params.get("t")) {
            (Some(a), Some(p), _) if !p.is_empty() => a.password == p,
            (Some(a), _, Some(t)) => a.token == t,
            _ => false,
        };
        let Some(account) = account.filter(|_| authorized) else {
            return failure(
                StatusCode::UNAUTHORIZED,
                "Invalid user/password combination. Please try again.",
                Some("invalid_credentials"),
            );
        };
        ok(json!({
            "Success": true,
            "User": user,
            "Token": account.token,
            "Score": account.score,
            "SoftcoreScore": account.softcore_score,
            "Messages": account.messages,
            "Permissions": account.permissions,
            "AccountType": account.account_type,
        }))
    }

    fn start_session(&mut self, params: &Params) -> Reply {
        let game_id = parse_id(params.get("g"));
        if let Err(reply) = self.authorize(params) {
            return reply;
        }
        if !self.games.contains_key(&game_id) {
            return failure(StatusCode::OK, "Unknown game", None);
        }
        let account = &self.accounts[params.get("u").unwrap_or_default()];
        let in_game = |u: &&UnlockRecord| {
            self.achievements
                .get(&u.achievement_id)
                .is_some_and(|a| a.game_id == game_id)
        };
        let entry = |u: &UnlockRecord| json!({ "ID": u.achievement_id, "When": u.when });
        let hardcore: Vec<Value> = account
            .unlocks
            .iter()
            .filter(in_game)
            .filter(|u| u.hardcore)
            .map(entry)
            .collect();
        let softcore: Vec<Value> = account
            .unlocks
            .iter()
            .filter(in_game)
            .filter(|u| !u.hardcore)
            .map(entry)
            .collect();
        ok(json!({
            "Success": true,
            "HardcoreUnlocks": hardcore,
            "Unlocks": softcore,
            "ServerNow": now(),
        }))
    }

    fn ping(&mut self, params: &Params) -> Reply {
        let account = match self.authorize(params) {
            Ok(account) => account,
            Err(reply) => return reply,
        };
        account.presence = params.get("m").map(str::to_string);
        ok(json!({ "Success": true }))
    }

    fn award_achievement(&mut self, params: &Params) -> Reply {
        let user = params.get("u").unwrap_or_default().to_string();
        let id = parse_id(params.get("a"));
        let hardcore_flag = params.get("h").unwrap_or("0");
        let hardcore = hardcore_flag == "1";
        let expected = md5_hex(&format!("{id}{user}{hardcore_flag}{id}"));
        let achievement = self.achievements.get(&id).copied();
        let remaining = achievement.map(|a| self.remaining(&user, a.game_id, hardcore));

        let account = match self.authorize(params) {
            Ok(account) => account,
            Err(reply) => return reply,
        };
        if params.get("v") != Some(expected.as_str()) {
            return failure(
                StatusCode::FORBIDDEN,
                "Invalid validation hash.",
                Some("access_denied"),
            );
        }
        let rejection = |account: &Account, message: &str| {
            let mut body = json!({
                "Success": false,
                "Error": message,
                "Score": account.score,
                "SoftcoreScore": account.softcore_score,
                "AchievementID": id,
            });
            if let Some(remaining) = remaining {
                body["AchievementsRemaining"] = json!(remaining);
            }
            ok(body)
        };
        let Some(achievement) = achievement else {
            return rejection(&*account, &format!("Data not found for achievement {id}"));
        };
        if !achievement.official {
            return rejection(&*account, "Unofficial achievements cannot be unlocked");
        }
        if !grant(account, id, achievement.points, hardcore) {
            return rejection(&*account, "User already has this achievement unlocked.");
        }
        ok(json!({
            "Success": true,
            "AchievementsRemaining": remaining.unwrap_or_default().saturating_sub(1),
            "Score": account.score,
            "SoftcoreScore": account.softcore_score,
            "AchievementID": id,
        }))
    }

    fn award_achievements(&mut self, params: &Params) -> Reply {
        let user = params.get("u").unwrap_or_default().to_string();
        let hardcore_flag = params.get("h").unwrap_or("0");
        let hardcore = hardcore_flag == "1";
        let ids: Result<Vec<u32>, _> = params
            .get("a")
            .unwrap_or_default()
            .split(',')
            .map(str::parse::<u32>)
            .collect();
        let Ok(ids) = ids else {
            return failure(
                StatusCode::BAD_REQUEST,
                "Invalid achievement list.",
                Some("invalid_parameter"),
            );
        };
        let concatenated: String = ids.iter().map(u32::to_string).collect();
        let expected = md5_hex(&format!("{concatenated}{user}{hardcore_flag}"));
        let achievements = self.achievements.clone();

        let account = match self.authorize(params) {
            Ok(account) => account,
            Err(reply) => return reply,
        };
        if params.get("v") != Some(expected.as_str()) {
            return failure(
                StatusCode::FORBIDDEN,
                "Invalid validation hash.",
                Some("access_denied"),
            );
        }
        let mut existing = Vec::new();
        let mut successful = Vec::new();
        for id in ids {
            match achievements.get(&id) {
                Some(a) if a.official => {
                    if grant(account, id, a.points, hardcore) {
                        successful.push(id);
                    } else {
                        existing.push(id);
                    }
                }
                _ => {}
            }
        }
        ok(json!({
            "Success": true,
            "Score": account.score,
            "SoftcoreScore": account.softcore_score,
            "ExistingIDs": existing,
            "SuccessfulIDs": successful,
        }))
    }

    /// Token check shared by every authenticated operation.
    fn authorize(&mut self, params: &Params) -> Result<&mut Account, Reply> {
        let user = params.get("u").unwrap_or_default();
        let token = params.get("t").unwrap_or_default();
        match self.accounts.get_mut(user) {
            Some(account) if !token.is_empty() && account.token == token => Ok(account),
            _ => Err(failure(
                StatusCode::UNAUTHORIZED,
                "Invalid user/token combination.",
                Some("invalid_credentials"),
            )),
        }
    }

    /// Official achievements of `game_id` not yet unlocked in the given mode.
    fn remaining(&self, user: &str, game_id: u32, hardcore: bool) -> u32 {
        let Some(account) = self.accounts.get(user) else {
            return 0;
        };
        let count = self
            .achievements
            .iter()
            .filter(|(_, a)| a.game_id == game_id && a.official)
            .filter(|(id, _)| match account.unlock(**id) {
                Some(u) => hardcore && !u.hardcore,
                None => true,
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Record an unlock. Returns false when nothing changed. A hardcore award
/// upgrades an existing softcore unlock and moves its points across.
fn grant(account: &mut Account, id: u32, points: u32, hardcore: bool) -> bool {
    let when = now();
    match account.unlocks.iter_mut().find(|u| u.achievement_id == id) {
        Some(u) if u.hardcore || !hardcore => false,
        Some(u) => {
            u.hardcore = true;
            u.when = when;
            account.softcore_score = account.softcore_score.saturating_sub(points);
            account.score += points;
            true
        }
        None => {
            account.unlocks.push(UnlockRecord {
                achievement_id: id,
                hardcore,
                when,
            });
            if hardcore {
                account.score += points;
            } else {
                account.softcore_score += points;
            }
            true
        }
    }
}

fn parse_id(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn failure(status: StatusCode, message: &str, code: Option<&str>) -> Reply {
    let mut body = json!({ "Success": false, "Error": message });
    if let Some(code) = code {
        body["Code"] = json!(code);
    }
    if status != StatusCode::OK {
        body["Status"] = json!(status.as_u16());
    }
    (status, Json(body))
}
