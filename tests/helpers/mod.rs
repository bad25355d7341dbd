//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use formrelay::{AppState, Config, create_app};
use formrelay_notification::{Mailer, MessageId, OutgoingMessage, SendError};
use http_body_util::BodyExt;
use serde_json::Value;

pub const ADMIN: &str = "admin@orivanta.test";
pub const CAREERS: &str = "careers@orivanta.test";
pub const ALLOWED_ORIGIN: &str = "https://www.orivanta.ai";

/// Mailer that keeps every accepted message and fails for chosen recipients.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMessage>>,
    fail_for: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, recipient: &str) {
        self.fail_for.lock().unwrap().insert(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Option<OutgoingMessage> {
        self.sent().into_iter().find(|m| m.to == recipient)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError> {
        if self.fail_for.lock().unwrap().contains(&message.to) {
            return Err(SendError::Transport(format!(
                "550 mailbox {} unavailable",
                message.to
            )));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(MessageId(format!("<{}@orivanta.test>", sent.len())))
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: config::Map<String, String> = [
        ("FORMRELAY__EMAIL__ADMIN_ADDRESS", ADMIN),
        ("FORMRELAY__EMAIL__CAREERS_ADDRESS", CAREERS),
        (
            "FORMRELAY__CORS__ALLOWED_ORIGINS",
            "https://www.orivanta.ai,http://localhost:3000",
        ),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::load_from(Some("does/not/exist.toml".to_string()), vars).unwrap()
}

pub fn app(mailer: Arc<RecordingMailer>) -> Router {
    app_with(test_config(&[]), mailer)
}

pub fn app_with(config: Config, mailer: Arc<RecordingMailer>) -> Router {
    create_app(AppState::new(config, mailer))
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn field_names(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
