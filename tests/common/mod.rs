#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sms_relay::RelayError;
use sms_relay::ai::{Classifier, Completer, Completion, CompletionRequest};
use sms_relay::core::models::Classification;
use sms_relay::escalation::{DirectDispatcher, EscalationNotifier};
use sms_relay::messaging::Messenger;
use sms_relay::pipeline::{InboundPipeline, PipelineSettings};
use sms_relay::store::MemoryStore;

pub const MANAGER: &str = "+15559990000";
pub const CUSTOMER: &str = "+15551234567";

/// Records every SMS instead of sending it.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(t, _)| t == to)
            .map(|(_, body)| body)
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String, RelayError> {
        if self.fail {
            return Err(RelayError::MessagingError("provider unavailable".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));
        Ok(format!("SM{}", sent.len()))
    }
}

/// Returns canned model output and remembers the prompts it saw.
#[derive(Default)]
pub struct ScriptedCompleter {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompleter {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, RelayError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RelayError::OpenAIError("no scripted reply left".to_string()))?;
        Ok(Completion::from_model_text(&reply))
    }
}

pub struct FixedClassifier(pub Classification);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, RelayError> {
        Ok(self.0)
    }
}

/// A pipeline wired to in-memory doubles, with the notifier running in-process.
pub struct Harness {
    pub messenger: Arc<RecordingMessenger>,
    pub completer: Arc<ScriptedCompleter>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            messenger: Arc::new(RecordingMessenger::default()),
            completer: Arc::new(ScriptedCompleter::replying(replies)),
            store: Arc::new(MemoryStore::new()),
        }
    }

    fn base_pipeline(&self) -> InboundPipeline {
        let notifier = EscalationNotifier::new(self.messenger.clone(), MANAGER.to_string());
        InboundPipeline::new(
            PipelineSettings::new(MANAGER.to_string()),
            self.messenger.clone(),
            self.completer.clone(),
            Arc::new(DirectDispatcher::new(notifier)),
        )
    }

    pub fn pipeline(&self) -> InboundPipeline {
        self.base_pipeline().with_store(self.store.clone())
    }

    pub fn pipeline_without_store(&self) -> InboundPipeline {
        self.base_pipeline()
    }

    pub fn pipeline_with_classifier(&self, classification: Classification) -> InboundPipeline {
        self.pipeline()
            .with_classifier(Arc::new(FixedClassifier(classification)))
    }
}
