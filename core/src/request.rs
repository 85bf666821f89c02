//! Request builders for `dorequest.php`.
//!
//! # Design
//! Each operation is a pure function from explicit inputs to an
//! `HttpRequest`. Validation runs first; on failure nothing is built.
//! Query parameters are appended in a fixed order so identical inputs always
//! produce byte-identical URLs.

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Multipart};
use crate::session::Session;
use crate::signature;

const ENDPOINT: &str = "dorequest.php";

/// Only a truly empty value is missing. Anything else is sent as given.
fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ApiError> {
    if value.is_empty() {
        return Err(ApiError::MissingField(field));
    }
    Ok(value)
}

fn hardcore_flag(hardcore: bool) -> &'static str {
    if hardcore {
        "1"
    } else {
        "0"
    }
}

/// `https://{host}/dorequest.php` with the given query pairs appended in order.
fn endpoint_url(host: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
    let host = require(host, "host")?;
    let mut url = Url::parse(&format!("https://{host}/{ENDPOINT}"))
        .map_err(|e| ApiError::InvalidHost(format!("{host}: {e}")))?;
    if url.path() != format!("/{ENDPOINT}") || url.query().is_some() {
        return Err(ApiError::InvalidHost(host.to_string()));
    }
    url.query_pairs_mut().extend_pairs(query);
    Ok(url.into())
}

/// Checks shared by every token-authenticated operation.
fn authenticated(session: &Session) -> Result<(&str, &str), ApiError> {
    require(session.host(), "host")?;
    let user = require(session.username(), "username")?;
    let token = require(session.token(), "token")?;
    Ok((user, token))
}

fn game_id(session: &Session) -> Result<String, ApiError> {
    session
        .game_id()
        .map(|g| g.to_string())
        .ok_or(ApiError::MissingField("game id"))
}

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url,
        form: None,
    }
}

fn post(url: String, form: Multipart) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Post,
        url,
        form: Some(form),
    }
}

/// Password login: `r=login2&u=..&p=..`.
pub fn build_login(host: &str, username: &str, password: &str) -> Result<HttpRequest, ApiError> {
    let user = require(username, "username")?;
    let password = require(password, "password")?;
    let url = endpoint_url(host, &[("r", "login2"), ("u", user), ("p", password)])?;
    tracing::debug!(operation = "login2", user, "built request");
    Ok(get(url))
}

/// Token login, used to refresh account details for a stored session:
/// `r=login2&u=..&t=..`.
pub fn build_login_with_token(session: &Session) -> Result<HttpRequest, ApiError> {
    let (user, token) = authenticated(session)?;
    let url = endpoint_url(session.host(), &[("r", "login2"), ("u", user), ("t", token)])?;
    tracing::debug!(operation = "login2", user, "built request");
    Ok(get(url))
}

/// `u=..&t=..&r=startsession&g=..`. The game comes from the session.
pub fn build_start_session(session: &Session) -> Result<HttpRequest, ApiError> {
    let (user, token) = authenticated(session)?;
    let game = game_id(session)?;
    let url = endpoint_url(
        session.host(),
        &[("u", user), ("t", token), ("r", "startsession"), ("g", &game)],
    )?;
    tracing::debug!(operation = "startsession", user, game = %game, "built request");
    Ok(get(url))
}

/// `u=..&t=..&r=ping&g=..` with the rich-presence text in form part `m`.
pub fn build_ping(session: &Session, message: &str) -> Result<HttpRequest, ApiError> {
    let (user, token) = authenticated(session)?;
    let game = game_id(session)?;
    let url = endpoint_url(
        session.host(),
        &[("u", user), ("t", token), ("r", "ping"), ("g", &game)],
    )?;
    tracing::debug!(operation = "ping", user, game = %game, "built request");
    Ok(post(url, Multipart::new().part("m", message)))
}

/// `u=..&t=..&r=awardachievement&h=..&a=..&v=..`.
pub fn build_award_achievement(
    session: &Session,
    achievement_id: u32,
) -> Result<HttpRequest, ApiError> {
    let (user, token) = authenticated(session)?;
    let id = achievement_id.to_string();
    let v = signature::award_achievement(achievement_id, user, session.hardcore());
    let url = endpoint_url(
        session.host(),
        &[
            ("u", user),
            ("t", token),
            ("r", "awardachievement"),
            ("h", hardcore_flag(session.hardcore())),
            ("a", &id),
            ("v", &v),
        ],
    )?;
    tracing::debug!(
        operation = "awardachievement",
        user,
        achievement_id,
        hardcore = session.hardcore(),
        "built request"
    );
    Ok(get(url))
}

/// `u=..&t=..&r=awardachievements` with form parts `h`, `a` (comma-joined
/// ids) and `v`, in that order.
pub fn build_award_achievements(
    session: &Session,
    achievement_ids: &[u32],
) -> Result<HttpRequest, ApiError> {
    let (user, token) = authenticated(session)?;
    if achievement_ids.is_empty() {
        return Err(ApiError::MissingField("achievement ids"));
    }
    let url = endpoint_url(
        session.host(),
        &[("u", user), ("t", token), ("r", "awardachievements")],
    )?;
    let ids = achievement_ids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let v = signature::award_achievements(achievement_ids, user, session.hardcore());
    let form = Multipart::new()
        .part("h", hardcore_flag(session.hardcore()))
        .part("a", ids)
        .part("v", v);
    tracing::debug!(
        operation = "awardachievements",
        user,
        count = achievement_ids.len(),
        hardcore = session.hardcore(),
        "built request"
    );
    Ok(post(url, form))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "retroachievements.org";

    fn session() -> Session {
        Session::new(HOST, "TimmoneSimmons", "0123456789abcdef")
    }

    #[test]
    fn build_login_produces_correct_request() {
        let req = build_login(HOST, "TimmoneSimmons", "supersecretpass").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?r=login2&u=TimmoneSimmons&p=supersecretpass"
        );
        assert!(req.form.is_none());
    }

    #[test]
    fn build_login_with_token_produces_correct_request() {
        let req = build_login_with_token(&session()).unwrap();
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?r=login2&u=TimmoneSimmons&t=0123456789abcdef"
        );
    }

    #[test]
    fn build_start_session_produces_correct_request() {
        let req = build_start_session(&session().for_game(32123)).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?u=TimmoneSimmons&t=0123456789abcdef&r=startsession&g=32123"
        );
        assert!(req.form.is_none());
    }

    #[test]
    fn build_ping_carries_message_in_form() {
        let req = build_ping(&session().for_game(32123), "Digging a hellevator 👌").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?u=TimmoneSimmons&t=0123456789abcdef&r=ping&g=32123"
        );
        let form = req.form.unwrap();
        assert_eq!(form.parts().len(), 1);
        assert_eq!(form.parts()[0].name, "m");
        assert_eq!(form.parts()[0].value, "Digging a hellevator 👌");
    }

    #[test]
    fn build_award_achievement_produces_signed_url() {
        let req = build_award_achievement(&session().with_hardcore(true), 32123).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?u=TimmoneSimmons&t=0123456789abcdef&r=awardachievement&h=1&a=32123&v=f4061a12710a0b39a9d07c960c3f4365"
        );
    }

    #[test]
    fn build_award_achievement_softcore_flag_is_zero() {
        let req = build_award_achievement(&session(), 32123).unwrap();
        assert!(req.url.contains("&h=0&a=32123&v="));
    }

    #[test]
    fn build_award_achievements_orders_form_parts() {
        let req = build_award_achievements(&session().with_hardcore(true), &[483244, 483245, 483246])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?u=TimmoneSimmons&t=0123456789abcdef&r=awardachievements"
        );
        let form = req.form.unwrap();
        let parts: Vec<(&str, &str)> = form
            .parts()
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(
            parts,
            [
                ("h", "1"),
                ("a", "483244,483245,483246"),
                ("v", "a7ac631302e34eee7b840b6e6c77ebed"),
            ]
        );
    }

    #[test]
    fn builds_are_deterministic() {
        let s = session().with_hardcore(true).for_game(32123);
        assert_eq!(build_ping(&s, "x").unwrap(), build_ping(&s, "x").unwrap());
        assert_eq!(
            build_award_achievements(&s, &[1, 2]).unwrap(),
            build_award_achievements(&s, &[1, 2]).unwrap()
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let req = build_login(HOST, "Timmone Simmons", "p&ss=word").unwrap();
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?r=login2&u=Timmone+Simmons&p=p%26ss%3Dword"
        );
    }

    #[test]
    fn missing_inputs_fail_validation() {
        assert_eq!(
            build_login("", "TimmoneSimmons", "pass").unwrap_err(),
            ApiError::MissingField("host")
        );
        assert_eq!(
            build_login(HOST, "", "pass").unwrap_err(),
            ApiError::MissingField("username")
        );
        assert_eq!(
            build_login(HOST, "TimmoneSimmons", "").unwrap_err(),
            ApiError::MissingField("password")
        );

        let no_token = Session::new(HOST, "TimmoneSimmons", "").for_game(1);
        assert_eq!(
            build_start_session(&no_token).unwrap_err(),
            ApiError::MissingField("token")
        );
        assert_eq!(
            build_start_session(&session()).unwrap_err(),
            ApiError::MissingField("game id")
        );
        assert_eq!(
            build_ping(&session(), "hi").unwrap_err(),
            ApiError::MissingField("game id")
        );
        assert_eq!(
            build_award_achievements(&session(), &[]).unwrap_err(),
            ApiError::MissingField("achievement ids")
        );
    }

    #[test]
    fn whitespace_values_are_sent_verbatim() {
        let req = build_login(HOST, " Tim", "  ").unwrap();
        assert_eq!(
            req.url,
            "https://retroachievements.org/dorequest.php?r=login2&u=+Tim&p=++"
        );
    }

    #[test]
    fn malformed_host_is_rejected() {
        let err = build_login("retro achievements.org", "TimmoneSimmons", "pass").unwrap_err();
        assert!(matches!(err, ApiError::InvalidHost(_)));
        assert!(err.is_validation());

        let err = build_login("example.org/evil?x=1", "TimmoneSimmons", "pass").unwrap_err();
        assert!(matches!(err, ApiError::InvalidHost(_)));
    }
}
