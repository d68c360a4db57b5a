//! Test server wrapper for integration tests
//!
//! Router plus shared state over a fixed in-memory card catalog, driven
//! with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use toy_common::ClipDescriptor;
use toy_watch::api::{create_router, AppContext};
use toy_watch::config::{PlayerSettings, SessionLimits};
use toy_watch::resolver::{CatalogResolver, MediaResolver};
use toy_watch::SharedState;

pub const APP_STORE_URL: &str = "https://apps.example/toy";

pub const PUBLIC_URL: &str = "https://toy.example";

pub const TEST_CATALOG: &str = r#"
[[cards]]
share_token = "abc"
title = "Happy birthday!"
recipient_name = "Sam"
status = "published"
host_id = "host"

[[cards.clips]]
id = "a"
media_url = "a.mp4"
order_position = 0
contributor_name = "Ana"
poster_url = "a.jpg"

[[cards.clips]]
id = "b"
media_url = "b.mp4"
order_position = 1
contributor_name = "Ben"

[[cards.clips]]
id = "c"
media_url = "c.mp4"
order_position = 2
participant_id = "host"
poster_url = "host.jpg"

[[cards]]
share_token = "legacy"
title = "Congrats"
recipient_name = "Lee"
status = "published"
video_url = "montage.mp4"

[[cards]]
share_token = "draft"
title = "Not yet"
recipient_name = "Kim"
status = "draft"
video_url = "draft.mp4"
"#;

/// Clips `ids[i]` with media `"{id}.mp4"` and order `i`
pub fn clips(ids: &[&str]) -> Vec<ClipDescriptor> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| ClipDescriptor::new(*id, format!("{}.mp4", id)).with_order(i as i64))
        .collect()
}

pub struct TestServer {
    router: Router,
    pub state: Arc<SharedState>,
}

impl TestServer {
    /// Server with autoplay off, so tests decide when playback starts
    pub fn start() -> Self {
        Self::with_settings(PlayerSettings {
            loading_timeout: Duration::from_millis(3000),
            autoplay: false,
            start_muted: true,
        })
    }

    pub fn with_settings(settings: PlayerSettings) -> Self {
        let resolver: Arc<dyn MediaResolver> =
            Arc::new(CatalogResolver::from_toml_str(TEST_CATALOG).expect("test catalog parses"));
        let state = Arc::new(SharedState::new());
        let ctx = AppContext {
            state: Arc::clone(&state),
            resolver,
            settings,
            sessions: SessionLimits::default(),
            app_store_url: Arc::from(APP_STORE_URL),
            public_url: Arc::from(PUBLIC_URL),
            port: 5780,
        };
        Self {
            router: create_router(ctx),
            state,
        }
    }

    /// Send a request; returns status, headers and JSON body (if any)
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Option<Value>) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };
        (status, headers, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Option<Value>) {
        let (status, _, body) = self.request(Method::GET, path, None).await;
        (status, body)
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Option<Value>) {
        let (status, _, body) = self.request(Method::POST, path, Some(body)).await;
        (status, body)
    }

    /// Mount a session for `token`, returning its id and first response
    pub async fn create_session(&self, token: &str) -> (String, Value) {
        let (status, _, body) = self
            .request(Method::POST, &format!("/watch/{}/sessions", token), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let body = body.expect("session body");
        let id = body["session_id"].as_str().expect("session id").to_string();
        (id, body)
    }

    pub async fn action(&self, id: &str, action: &str) -> Value {
        let (status, body) = self
            .post(&format!("/sessions/{}/actions", id), serde_json::json!({ "action": action }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body.expect("action body")
    }

    pub async fn signal(&self, id: &str, slot: &str, signal: &str) -> Value {
        let (status, body) = self
            .post(
                &format!("/sessions/{}/media", id),
                serde_json::json!({ "slot": slot, "signal": signal }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body.expect("media body")
    }
}
