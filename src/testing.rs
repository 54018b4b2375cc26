//! Test doubles for the external prediction service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;

/// Stand-in prediction model that answers every POST with a canned reply
/// and records what it was sent.
#[derive(Clone, Default)]
pub struct MockPredictor {
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    /// Serve `reply` at `path` on an ephemeral port; returns the base url.
    pub async fn serve(&self, path: &str, status: StatusCode, reply: Value) -> String {
        let hits = self.hits.clone();
        let last_body = self.last_body.clone();
        let handler = move |Json(body): Json<Value>| {
            hits.fetch_add(1, Ordering::SeqCst);
            *last_body.lock().unwrap() = Some(body);
            let reply = reply.clone();
            async move { (status, Json(reply)) }
        };

        serve(Router::new().route(path, post(handler))).await
    }
}

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A local address with nothing listening on it.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
