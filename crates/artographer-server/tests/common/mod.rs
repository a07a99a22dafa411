#![allow(dead_code)]

use std::sync::Arc;

use artographer_api::{AppState, AppStateInner};
use artographer_db::Database;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

pub struct TestApp {
    pub router: Router,
    /// Direct database access for seeding rows the API cannot write.
    pub state: AppState,
    _dir: TempDir,
}

/// A router over a fresh on-disk database, with a one-page dashboard.
pub fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("artographer.db")).unwrap();

    let dashboard_dir = dir.path().join("dashboard");
    std::fs::create_dir_all(&dashboard_dir).unwrap();
    std::fs::write(
        dashboard_dir.join("index.html"),
        "<!doctype html><title>Artographer</title>",
    )
    .unwrap();

    let state = Arc::new(AppStateInner::new(db));
    let router = artographer_server::app(state.clone(), &dashboard_dir);
    TestApp {
        router,
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}
