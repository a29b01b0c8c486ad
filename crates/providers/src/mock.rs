use crate::Provider;
use crate::types::*;
use serde::{Deserialize, Serialize};
use socratic_core::Result;
use std::fs;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_stream::Stream;

/// Scripted reply for offline runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    Text { content: String },
    Error { message: String },
    Sequence { events: Vec<MockEvent> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MockEvent {
    Token { text: String },
    Error { message: String },
    Done,
}

#[derive(Debug, Deserialize)]
struct MockConfig {
    responses: Vec<MockResponse>,
}

/// Provider that replays scripted responses in order, one per request.
///
/// Once the script runs out the last response is repeated.
pub struct MockProvider {
    responses: Vec<MockResponse>,
    current: AtomicUsize,
}

impl MockProvider {
    pub fn new(responses_file: Option<&Path>) -> Self {
        let responses = match responses_file {
            Some(path) => Self::load_responses(path),
            None => vec![MockResponse::Text {
                content: "What do you already know about how this algorithm compares elements?".to_string(),
            }],
        };

        Self::with_responses(responses)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self { responses, current: AtomicUsize::new(0) }
    }

    fn load_responses(path: &Path) -> Vec<MockResponse> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Mock responses file not found");
            return vec![MockResponse::Error { message: format!("Mock responses file not found: {}", path.display()) }];
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<MockConfig>(&content) {
                Ok(config) => config.responses,
                Err(e) => {
                    tracing::error!("Failed to parse mock responses: {}", e);
                    vec![MockResponse::Error { message: format!("Failed to parse mock responses: {}", e) }]
                }
            },
            Err(e) => {
                tracing::error!("Failed to read mock responses file: {}", e);
                vec![MockResponse::Error { message: format!("Failed to read mock responses file: {}", e) }]
            }
        }
    }

    fn next_response(&self) -> MockResponse {
        let index = self.current.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index).or_else(|| self.responses.last()) {
            Some(response) => response.clone(),
            None => MockResponse::Error { message: "No mock responses configured".to_string() },
        }
    }

    /// Number of requests served so far
    pub fn calls(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn stream_chat<'a>(
        &'a self, _request: ChatRequest, _cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        let response = self.next_response();

        let stream = async_stream::stream! {
            match response {
                MockResponse::Text { content } => {
                    yield StreamEvent::Token(content);
                }
                MockResponse::Error { message } => {
                    yield StreamEvent::Error(message);
                    return;
                }
                MockResponse::Sequence { events } => {
                    for event in events {
                        match event {
                            MockEvent::Token { text } => yield StreamEvent::Token(text),
                            MockEvent::Error { message } => {
                                yield StreamEvent::Error(message);
                                return;
                            }
                            MockEvent::Done => break,
                        }
                    }
                }
            }
            yield StreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
