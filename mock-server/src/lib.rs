use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of a request, returned by `/echo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", any(hello))
        .route("/echo", any(echo))
        .route("/echo/{*path}", any(echo_path))
        .route("/ping", post(ping))
        .route("/status/{code}", any(status))
        .route("/redirect/{code}", any(redirect))
        .route("/delay/{millis}", get(delay))
        .route("/duplicate-headers", get(duplicate_headers))
        .route("/users/{id}/{text}", get(user_path))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello(method: Method) -> impl IntoResponse {
    ([("x-echo-method", method.to_string())], "Hello, World!\n")
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    Json(build_echo(method, String::new(), query, headers, body))
}

async fn echo_path(
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    Json(build_echo(method, path, query, headers, body))
}

fn build_echo(
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
) -> Echo {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Echo {
        method: method.to_string(),
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

async fn ping(Json(input): Json<Message>) -> Result<Json<Message>, StatusCode> {
    if input.message != "ping" {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(Message {
        message: "pong".to_string(),
    }))
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

#[derive(Debug, Deserialize)]
struct RedirectTarget {
    to: String,
}

/// Replies with `code` and a `location` of `?to=`.
async fn redirect(Path(code): Path<u16>, Query(target): Query<RedirectTarget>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, [(header::LOCATION, target.to)])
}

async fn delay(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}

async fn duplicate_headers() -> impl IntoResponse {
    (
        AppendHeaders([("x-dup", "first"), ("x-dup", "second")]),
        "duplicated",
    )
}

async fn user_path(Path((id, text)): Path<(u64, String)>) -> Json<BTreeMap<String, String>> {
    Json(BTreeMap::from([
        ("id".to_string(), id.to_string()),
        ("text".to_string(), text),
    ]))
}
