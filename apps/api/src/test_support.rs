//! Shared fixtures for router-level tests: a scripted `AiProvider` and
//! request builders driven through `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::llm_client::{AiProvider, LlmError};
use crate::routes::build_router;
use crate::signup::store::SignupLog;
use crate::state::AppState;

const BOUNDARY: &str = "cardinal-test-boundary";

/// Deterministic provider. Returns a fixed reply (or fails) and records prompts.
#[derive(Clone)]
pub struct FakeAi {
    reply: String,
    fail: bool,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl Default for FakeAi {
    fn default() -> Self {
        Self::with_reply("A residential yard photographed from the street.")
    }
}

impl FakeAi {
    pub const AUDIO: &'static [u8] = &[0xFF, 0xFB, 0x90, 0x44, 0x00];

    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) -> Result<(), LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        if self.fail {
            Err(LlmError::Api {
                status: 503,
                message: "provider unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AiProvider for FakeAi {
    async fn chat(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.record(prompt)?;
        Ok(self.reply.clone())
    }

    async fn describe_image(
        &self,
        _image: &[u8],
        _mime: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.record(prompt)?;
        Ok(self.reply.clone())
    }

    async fn speak(&self, text: &str, _voice: &str) -> Result<Bytes, LlmError> {
        self.record(text)?;
        Ok(Bytes::from_static(Self::AUDIO))
    }
}

pub fn test_config() -> Config {
    Config {
        openai_api_key: "test-key".to_string(),
        openai_base_url: "http://127.0.0.1:9".to_string(),
        chat_model: "gpt-4o-mini".to_string(),
        vision_model: "gpt-4o-mini".to_string(),
        tts_model: "gpt-4o-mini-tts".to_string(),
        tts_voice: "alloy".to_string(),
        port: 10000,
        rust_log: "info".to_string(),
        max_upload_bytes: 1024 * 1024,
        admin: Default::default(),
    }
}

pub fn test_state(ai: FakeAi) -> AppState {
    AppState {
        ai: Arc::new(ai),
        config: Arc::new(test_config()),
        signups: SignupLog::new(),
    }
}

pub async fn send_raw(ai: FakeAi, request: Request<Body>) -> Response {
    build_router(test_state(ai)).oneshot(request).await.unwrap()
}

/// Sends a request and returns the status with the body parsed as JSON
/// (`Value::Null` when the body is not JSON).
pub async fn send_with_state(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn send(ai: FakeAi, request: Request<Body>) -> (StatusCode, Value) {
    send_with_state(test_state(ai), request).await
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart/form-data body.
pub struct Part {
    name: &'static str,
    file: Option<(&'static str, &'static str)>,
    data: Vec<u8>,
}

impl Part {
    pub fn file(
        name: &'static str,
        file_name: &'static str,
        content_type: &'static str,
        data: &[u8],
    ) -> Self {
        Self {
            name,
            file: Some((file_name, content_type)),
            data: data.to_vec(),
        }
    }

    pub fn text(name: &'static str, value: &str) -> Self {
        Self {
            name,
            file: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
