//! Scripted collaborator doubles for the generator and the gateway.

use async_trait::async_trait;
use leasebot::gateway::MessageSender;
use leasebot::providers::{GenerationError, TextGenerator};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Generator double. Conversational prompts are answered with their task
/// line (the last prompt line), which keeps replies deterministic and lets
/// tests assert on what was asked. Matching prompts are answered from
/// `match_answer` ("NONE" unless scripted).
pub struct MockGenerator {
    pub prompts: Mutex<Vec<String>>,
    match_answer: Mutex<String>,
    fail: AtomicBool,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            match_answer: Mutex::new("NONE".to_string()),
            fail: AtomicBool::new(false),
        }
    }
}

#[allow(dead_code)]
impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_matches_with(&self, answer: &str) {
        *self.match_answer.lock().unwrap() = answer.to_string();
    }

    pub fn fail_all_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Completion("scripted outage".to_string()));
        }

        if prompt.contains("property matching assistant") {
            return Ok(self.match_answer.lock().unwrap().clone());
        }

        Ok(prompt.lines().last().unwrap_or_default().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text { to: String, body: String },
    Image { to: String, url: String, caption: Option<String> },
    Document { to: String, url: String, filename: String },
}

/// Gateway double that records every send.
pub struct MockSender {
    pub sent: Mutex<Vec<SentMessage>>,
    succeed: AtomicBool,
}

impl Default for MockSender {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            succeed: AtomicBool::new(true),
        }
    }
}

#[allow(dead_code)]
impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all_sends(&self) {
        self.succeed.store(false, Ordering::SeqCst);
    }

    pub fn texts_to(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                SentMessage::Text { to: t, body } if t == to => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn images_to(&self, to: &str) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, SentMessage::Image { to: t, .. } if t == to))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_text(&self, to: &str, body: &str) -> bool {
        self.sent.lock().unwrap().push(SentMessage::Text {
            to: to.to_string(),
            body: body.to_string(),
        });
        self.succeed.load(Ordering::SeqCst)
    }

    async fn send_image(&self, to: &str, url: &str, caption: Option<&str>) -> bool {
        self.sent.lock().unwrap().push(SentMessage::Image {
            to: to.to_string(),
            url: url.to_string(),
            caption: caption.map(str::to_string),
        });
        self.succeed.load(Ordering::SeqCst)
    }

    async fn send_document(&self, to: &str, url: &str, filename: &str) -> bool {
        self.sent.lock().unwrap().push(SentMessage::Document {
            to: to.to_string(),
            url: url.to_string(),
            filename: filename.to_string(),
        });
        self.succeed.load(Ordering::SeqCst)
    }
}
