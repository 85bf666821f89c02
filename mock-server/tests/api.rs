use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_db, seeded_db};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "XyZ0123";
const AUTH: &str = "u=TimmoneSimmons&t=0123456789abcdef";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(query: &str) -> Request<String> {
    Request::builder()
        .uri(format!("/dorequest.php?{query}"))
        .body(String::new())
        .unwrap()
}

fn form_request(query: &str, parts: &[(&str, &str)]) -> Request<String> {
    let mut body = String::new();
    for (name, value) in parts {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(format!("/dorequest.php?{query}"))
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

// --- login ---

#[tokio::test]
async fn login_with_password() {
    let resp = app()
        .oneshot(get_request("r=login2&u=TimmoneSimmons&p=supersecretpass"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["Success"], true);
    assert_eq!(body["User"], "TimmoneSimmons");
    assert_eq!(body["Token"], "0123456789abcdef");
    assert_eq!(body["Score"], 69420);
    assert_eq!(body["AccountType"], "Developer");
}

#[tokio::test]
async fn login_with_token() {
    let resp = app()
        .oneshot(get_request("r=login2&u=TimmoneSimmons&t=0123456789abcdef"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_unknown_user_returns_401() {
    let resp = app()
        .oneshot(get_request("r=login2&u=Nobody&p=x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["Success"], false);
    assert_eq!(body["Code"], "invalid_credentials");
    assert_eq!(body["Status"], 401);
}

// --- startsession ---

#[tokio::test]
async fn start_session_known_game() {
    let resp = app()
        .oneshot(get_request(&format!("{AUTH}&r=startsession&g=32123")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["Success"], true);
    assert!(body["HardcoreUnlocks"].as_array().unwrap().is_empty());
    assert!(body["ServerNow"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn start_session_unknown_game() {
    let resp = app()
        .oneshot(get_request(&format!("{AUTH}&r=startsession&g=1")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"Success": false, "Error": "Unknown game"}));
}

#[tokio::test]
async fn bad_token_returns_401() {
    let resp = app()
        .oneshot(get_request("u=TimmoneSimmons&t=wrong&r=startsession&g=32123"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["Error"], "Invalid user/token combination.");
}

// --- ping ---

#[tokio::test]
async fn ping_stores_multipart_presence() {
    let db = seeded_db();
    let resp = app_with_db(db.clone())
        .oneshot(form_request(
            &format!("{AUTH}&r=ping&g=32123"),
            &[("m", "Digging a hellevator 👌")],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["Success"], true);
    assert_eq!(
        db.read().await.presence("TimmoneSimmons"),
        Some("Digging a hellevator 👌")
    );
}

#[tokio::test]
async fn malformed_multipart_returns_400() {
    let req = Request::builder()
        .method("POST")
        .uri(format!("/dorequest.php?{AUTH}&r=ping&g=32123"))
        .header(http::header::CONTENT_TYPE, "multipart/form-data")
        .body("garbage".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body_bytes(resp).await;
    assert!(!bytes.is_empty());
}

// --- awardachievement ---

#[tokio::test]
async fn award_achievement_then_duplicate() {
    let db = seeded_db();
    let v = md5_hex("483244TimmoneSimmons1483244");
    let query = format!("{AUTH}&r=awardachievement&h=1&a=483244&v={v}");

    let resp = app_with_db(db.clone())
        .oneshot(get_request(&query))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["Success"], true);
    assert_eq!(body["AchievementID"], 483244);
    assert_eq!(body["Score"], 69425);
    assert_eq!(body["AchievementsRemaining"], 3);

    let resp = app_with_db(db).oneshot(get_request(&query)).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["Success"], false);
    assert_eq!(body["Error"], "User already has this achievement unlocked.");
    assert_eq!(body["AchievementID"], 483244);
    assert_eq!(body["AchievementsRemaining"], 3);
}

#[tokio::test]
async fn award_unknown_achievement() {
    let v = md5_hex("0TimmoneSimmons10");
    let resp = app()
        .oneshot(get_request(&format!(
            "{AUTH}&r=awardachievement&h=1&a=0&v={v}"
        )))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["Success"], false);
    assert_eq!(body["Error"], "Data not found for achievement 0");
    assert_eq!(body["AchievementID"], 0);
    assert_eq!(body["Score"], 69420);
}

#[tokio::test]
async fn award_unofficial_achievement() {
    let v = md5_hex("483248TimmoneSimmons0483248");
    let resp = app()
        .oneshot(get_request(&format!(
            "{AUTH}&r=awardachievement&h=0&a=483248&v={v}"
        )))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["Error"], "Unofficial achievements cannot be unlocked");
}

// --- awardachievements ---

#[tokio::test]
async fn award_achievements_splits_existing_and_successful() {
    let db = seeded_db();
    let single = md5_hex("483244TimmoneSimmons1483244");
    app_with_db(db.clone())
        .oneshot(get_request(&format!(
            "{AUTH}&r=awardachievement&h=1&a=483244&v={single}"
        )))
        .await
        .unwrap();

    let v = md5_hex("483244483245483246TimmoneSimmons1");
    let resp = app_with_db(db)
        .oneshot(form_request(
            &format!("{AUTH}&r=awardachievements"),
            &[("h", "1"), ("a", "483244,483245,483246"), ("v", &v)],
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["Success"], true);
    assert_eq!(body["ExistingIDs"], serde_json::json!([483244]));
    assert_eq!(body["SuccessfulIDs"], serde_json::json!([483245, 483246]));
    assert_eq!(body["Score"], 69420 + 5 + 10 + 25);
}

#[tokio::test]
async fn award_achievements_bad_hash_returns_403() {
    let resp = app()
        .oneshot(form_request(
            &format!("{AUTH}&r=awardachievements"),
            &[("h", "1"), ("a", "483245"), ("v", "nope")],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
