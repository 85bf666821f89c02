//! Mock of the RetroAchievements `dorequest.php` endpoint.
//!
//! Serves every operation from a single route, reading arguments from the
//! query string and, for `POST`, from a `multipart/form-data` body.

pub mod service;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub use service::{Params, Service};

pub type Db = Arc<RwLock<Service>>;

pub fn seeded_db() -> Db {
    Arc::new(RwLock::new(Service::seeded()))
}

pub fn app() -> Router {
    app_with_db(seeded_db())
}

/// Router over caller-owned state, so tests can inspect what the server saw.
pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/dorequest.php", get(dorequest).post(dorequest))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

async fn dorequest(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
    request: Request,
) -> Response {
    let form = match read_form(request).await {
        Ok(form) => form,
        Err(error) => {
            tracing::warn!(%error, "unreadable form body");
            let body = json!({ "Success": false, "Error": error, "Status": 400 });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };
    let params = Params { query, form };
    let (status, body) = db.write().await.dispatch(&params);
    tracing::info!(
        r = params.get("r").unwrap_or_default(),
        u = params.get("u").unwrap_or_default(),
        status = status.as_u16(),
        "dorequest"
    );
    (status, body).into_response()
}

/// Collect multipart fields as text. Non-multipart bodies yield no fields.
async fn read_form(request: Request) -> Result<HashMap<String, String>, String> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if !is_multipart {
        return Ok(HashMap::new());
    }
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| e.body_text())?;
    let mut form = HashMap::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|e| e.body_text())?;
        form.insert(name, value);
    }
    Ok(form)
}
