// src/client.rs
//! HTTP client for the relay: one-shot submit, health, and a self-test probe.

use std::{
    fmt,
    time::{Duration, Instant},
};

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::message::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RELAY_URL: &str = "http://localhost:5001";
pub const PROBE_MESSAGE: &str = "test";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("request timed out after {}s, the relay did not respond", .0.as_secs_f32())]
    TimedOut(Duration),

    #[error("network failure, check your connection: {0}")]
    Network(String),

    #[error("relay responded with {status}: {message}")]
    Server { status: u16, message: String },

    #[error("could not decode relay response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one message and returns the relay's reply. Blank input is
    /// rejected here without touching the network.
    pub async fn submit(&self, text: &str) -> Result<ChatResponse, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        self.post_chat(text).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }

    /// Posts a canned probe and classifies what came back.
    pub async fn self_test(&self) -> SelfTestReport {
        let started = Instant::now();
        let outcome = match self.post_chat(PROBE_MESSAGE).await {
            Ok(_) => ProbeOutcome::Healthy,
            Err(ClientError::Server { status, message }) => ProbeOutcome::RelayError { status, message },
            Err(ClientError::TimedOut(_)) => ProbeOutcome::TimedOut,
            Err(ClientError::Decode(msg)) => ProbeOutcome::Malformed(msg),
            Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        };

        SelfTestReport {
            base_url: self.base_url.clone(),
            latency: started.elapsed(),
            outcome,
        }
    }

    async fn post_chat(&self, text: &str) -> Result<ChatResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .timeout(self.timeout)
            .json(&ChatRequest::new(text))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::TimedOut(self.timeout)
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    /// The relay answered, but with an error (usually the provider).
    RelayError { status: u16, message: String },
    TimedOut,
    Unreachable(String),
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct SelfTestReport {
    pub base_url: String,
    pub latency: Duration,
    pub outcome: ProbeOutcome,
}

impl SelfTestReport {
    pub fn is_healthy(&self) -> bool {
        self.outcome == ProbeOutcome::Healthy
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relay: {}", self.base_url)?;
        writeln!(f, "Latency: {} ms", self.latency.as_millis())?;

        match &self.outcome {
            ProbeOutcome::Healthy => {
                writeln!(f, "OK: relay reachable")?;
                return writeln!(f, "OK: completion provider answered");
            }
            ProbeOutcome::RelayError { status, message } => {
                writeln!(f, "OK: relay reachable")?;
                writeln!(f, "FAIL: relay returned {status}: {message}")?;
            }
            ProbeOutcome::TimedOut => writeln!(f, "FAIL: timed out, the relay is not responding")?,
            ProbeOutcome::Unreachable(msg) => writeln!(f, "FAIL: {msg}")?,
            ProbeOutcome::Malformed(msg) => writeln!(f, "FAIL: unexpected response: {msg}")?,
        }

        writeln!(f)?;
        writeln!(f, "Suggested steps:")?;
        writeln!(f, "1. Make sure the relay is running on the expected port")?;
        writeln!(f, "2. Check OPENAI_API_KEY in the relay's environment or .env file")?;
        writeln!(f, "3. Check the relay logs for provider errors")
    }
}
