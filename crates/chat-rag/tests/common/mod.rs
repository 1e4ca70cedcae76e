//! Recording stub providers shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chat_rag::error::{Error, Result};
use chat_rag::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use chat_rag::server::{state::AppState, RagServer};
use chat_rag::{Hit, RagConfig};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// What a stub does when called
#[derive(Clone)]
pub enum Reply<T> {
    Value(T),
    Fail(&'static str),
    /// Never answers within any test deadline
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self, make_err: fn(String) -> Error) -> Result<T> {
        match self {
            Reply::Value(value) => Ok(value.clone()),
            Reply::Fail(message) => Err(make_err(message.to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(make_err("stub hung".to_string()))
            }
        }
    }
}

/// Calls seen by one stub
#[derive(Default)]
pub struct CallLog {
    inputs: Mutex<Vec<String>>,
    completed: AtomicUsize,
    cancelled: AtomicUsize,
}

impl CallLog {
    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn start(&self, input: String) -> CallGuard<'_> {
        self.inputs.lock().unwrap().push(input);
        CallGuard {
            log: self,
            finished: false,
        }
    }
}

/// Counts a call as cancelled if its future is dropped before finishing
struct CallGuard<'a> {
    log: &'a CallLog,
    finished: bool,
}

impl CallGuard<'_> {
    fn finish(mut self) {
        self.finished = true;
        self.log.completed.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.log.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct StubEmbedder {
    pub log: Arc<CallLog>,
    reply: Reply<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let guard = self.log.start(text.to_string());
        let out = self.reply.resolve(Error::Embedding).await;
        guard.finish();
        out
    }

    fn name(&self) -> &str {
        "stub-embedder"
    }
}

pub struct StubStore {
    pub log: Arc<CallLog>,
    reply: Reply<Vec<Hit>>,
}

#[async_trait]
impl VectorStoreProvider for StubStore {
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<Hit>> {
        let guard = self
            .log
            .start(format!("dims={} k={}", query_embedding.len(), top_k));
        let out = self.reply.resolve(Error::Search).await;
        guard.finish();
        out
    }

    fn name(&self) -> &str {
        "stub-store"
    }
}

pub struct StubLlm {
    pub log: Arc<CallLog>,
    reply: Reply<String>,
}

#[async_trait]
impl LlmProvider for StubLlm {
    /// Records `model=<model or default>` on the first line, then the prompt
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        let guard = self
            .log
            .start(format!("model={}\n{}", model.unwrap_or("default"), prompt));
        let out = self.reply.resolve(Error::Generation).await;
        guard.finish();
        out
    }

    fn name(&self) -> &str {
        "stub-llm"
    }

    fn model(&self) -> &str {
        "default"
    }
}

/// Router wired to stub providers, plus their call logs
pub struct Harness {
    pub router: Router,
    pub state: AppState,
    pub embedder: Arc<CallLog>,
    pub store: Arc<CallLog>,
    pub llm: Arc<CallLog>,
}

impl Harness {
    pub fn new(
        config: RagConfig,
        embed: Reply<Vec<f32>>,
        hits: Reply<Vec<Hit>>,
        answer: Reply<String>,
    ) -> Self {
        let embedder = Arc::new(StubEmbedder {
            log: Arc::default(),
            reply: embed,
        });
        let store = Arc::new(StubStore {
            log: Arc::default(),
            reply: hits,
        });
        let llm = Arc::new(StubLlm {
            log: Arc::default(),
            reply: answer,
        });

        let logs = (
            Arc::clone(&embedder.log),
            Arc::clone(&store.log),
            Arc::clone(&llm.log),
        );
        let state = AppState::with_providers(config, embedder, store, llm);
        let router = RagServer::with_state(state.clone()).build_router();

        Self {
            router,
            state,
            embedder: logs.0,
            store: logs.1,
            llm: logs.2,
        }
    }

    /// Stubs that all succeed
    pub fn healthy(hits: Vec<Hit>, answer: &str) -> Self {
        Self::new(
            test_config(),
            Reply::Value(vec![0.1, 0.2, 0.3]),
            Reply::Value(hits),
            Reply::Value(answer.to_string()),
        )
    }

    pub fn total_calls(&self) -> usize {
        self.embedder.calls() + self.store.calls() + self.llm.calls()
    }

    /// POST a raw body to /chat without a content type
    pub async fn post_chat(&self, body: &str) -> (StatusCode, Value) {
        send(
            self.router.clone(),
            Request::builder()
                .method(Method::POST)
                .uri("/chat")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a JSON body to /chat with `Content-Type: application/json`
    pub async fn post_json(&self, body: &str) -> (StatusCode, Value) {
        send(
            self.router.clone(),
            Request::builder()
                .method(Method::POST)
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn request(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        send(
            self.router.clone(),
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

pub fn test_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.pipeline.top_k = 3;
    config.pipeline.request_timeout_secs = 2;
    config.server.enable_cors = false;
    config
}

pub fn sample_hits() -> Vec<Hit> {
    vec![
        Hit::new("7", 0.42, "Tomatoes need six hours of sun.", "garden.txt"),
        Hit::new("b1c2", 0.87, "Water deeply twice a week.", "watering.md"),
        Hit::new("3", 0.11, "Mulch keeps soil moist.", ""),
    ]
}

/// Send a request and decode the body as JSON; non-JSON bodies come back
/// as a JSON string and empty bodies as null.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("request success");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, body)
}
