#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use support_relay::config::RelayConfig;
use support_relay::services::completion::{
    Completion, CompletionProvider, CompletionRequest, ProviderError,
};

#[derive(Clone, Debug)]
pub enum Behavior {
    Reply(String),
    NoCandidates,
    Unauthorized,
    Timeout,
    Fail(u16, String),
    Slow(Duration, String),
}

/// Scripted provider: plays `script` in order, then repeats `fallback`.
pub struct StubProvider {
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    pub fn new(fallback: Behavior) -> Self {
        Self::scripted(Vec::new(), fallback)
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn scripted(script: Vec<Behavior>, fallback: Behavior) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match behavior {
            Behavior::Reply(text) => Ok(Completion { candidates: vec![text, "second".into()] }),
            Behavior::NoCandidates => Ok(Completion { candidates: vec![] }),
            Behavior::Unauthorized => Err(ProviderError::Unauthorized("Incorrect API key provided".into())),
            Behavior::Timeout => Err(ProviderError::Timeout),
            Behavior::Fail(status, message) => Err(ProviderError::Status { status, message }),
            Behavior::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Completion { candidates: vec![text] })
            }
        }
    }
}

/// Config with a dummy credential plus `overrides`.
pub fn test_config(overrides: &[(&str, &str)]) -> RelayConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        (
            "STATIC_DIR".to_string(),
            concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        ),
    ]);
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    RelayConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn is_iso_timestamp(value: &str) -> bool {
    value.ends_with('Z') && chrono::DateTime::parse_from_rfc3339(value).is_ok()
}
