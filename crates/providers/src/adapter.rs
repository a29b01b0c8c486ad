use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use eventsource_stream::Eventsource;
use futures::{StreamExt, stream::Stream};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

use crate::mock::MockProvider;
use crate::types::*;
pub use socratic_core::config::DEFAULT_GEMINI_BASE_URL;
use socratic_core::{ProviderConfig, Result};

/// Generic provider trait for LLM backends
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Stream a chat completion
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Gemini provider implementation
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        }
    }

    fn stream_url(&self) -> String {
        format!("{}/models/{}:streamGenerateContent?alt=sse", self.base_url.trim_end_matches('/'), self.model)
    }

    /// Convert ChatRequest to Gemini API format
    fn to_gemini_request(&self, request: &ChatRequest) -> GeminiChatRequest {
        let mut system_instruction = None;
        let mut contents: Vec<GeminiContent> = Vec::new();

        for msg in &request.messages {
            let mut parts = Vec::with_capacity(1 + msg.media.len());
            if !msg.content.is_empty() {
                parts.push(GeminiPart { text: Some(msg.content.clone()), ..Default::default() });
            }
            parts.extend(msg.media.iter().map(|media| GeminiPart {
                inline_data: Some(GeminiBlob { mime_type: media.mime_type.clone(), data: BASE64.encode(&media.data) }),
                ..Default::default()
            }));

            match msg.role {
                Role::System => system_instruction = Some(GeminiSystemInstruction { parts }),
                Role::User => contents.push(GeminiContent { role: Some("user".to_string()), parts }),
                Role::Assistant => contents.push(GeminiContent { role: Some("model".to_string()), parts }),
            }
        }

        let generation_config = GeminiGenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            top_k: request.top_k,
            max_output_tokens: request.max_tokens,
            response_mime_type: request.response_mime_type.clone(),
        };

        GeminiChatRequest { contents, system_instruction, generation_config: Some(generation_config) }
    }

    /// Parse one SSE data payload. `None` means the chunk carried nothing to report.
    fn parse_chunk(&self, chunk: &str) -> Option<StreamEvent> {
        if chunk.trim().is_empty() {
            return None;
        }

        let data = match serde_json::from_str::<GeminiChunk>(chunk) {
            Ok(data) => data,
            Err(_) => return Some(StreamEvent::Error(format!("Failed to parse chunk: {}", chunk))),
        };

        if let Some(error) = data.error {
            return Some(StreamEvent::Error(error.describe()));
        }

        if let Some(reason) = data.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Some(StreamEvent::Error(format!("Prompt blocked: {}", reason)));
        }

        let candidate = data.candidates.and_then(|candidates| candidates.into_iter().next())?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if !text.is_empty() {
            if let Some(reason) = candidate.finish_reason.as_deref().filter(|reason| *reason != "STOP") {
                tracing::warn!(reason, model = %self.model, "Reply cut short");
            }
            return Some(StreamEvent::Token(text));
        }

        match candidate.finish_reason.as_deref() {
            None | Some("STOP") => None,
            Some(reason) => Some(StreamEvent::Error(format!("Generation stopped: {}", reason))),
        }
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        let gemini_request = self.to_gemini_request(&request);
        let url = self.stream_url();
        let cancel_token_clone = cancel_token.clone();

        let stream = async_stream::stream! {
            if cancel_token.is_cancelled() {
                yield StreamEvent::Error("Cancelled before request".to_string());
                return;
            }

            let response = match self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&gemini_request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield StreamEvent::Error(format!("Gemini request failed: {}", e));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                yield StreamEvent::Error(format!("Gemini API error: {} - {}", status, error_message(&body)));
                return;
            }

            let eventsource = response.bytes_stream().eventsource();
            tokio::pin!(eventsource);

            while let Some(event_result) = eventsource.next().await {
                if cancel_token_clone.is_cancelled() {
                    yield StreamEvent::Error("Cancelled by user".to_string());
                    return;
                }

                match event_result {
                    Ok(event) => match self.parse_chunk(&event.data) {
                        Some(StreamEvent::Error(message)) => {
                            yield StreamEvent::Error(message);
                            return;
                        }
                        Some(parsed) => yield parsed,
                        None => {}
                    },
                    Err(e) => {
                        yield StreamEvent::Error(format!("SSE error: {}", e));
                        return;
                    }
                }
            }

            yield StreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.describe())
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChatRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiBlob>,
}

/// Inline binary data, base64 encoded
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChunk {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GeminiError {
    fn describe(&self) -> String {
        match &self.status {
            Some(status) => format!("{} ({})", self.message, status),
            None => self.message.clone(),
        }
    }
}

/// Factory to create providers from config
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the configured provider. Fails when the Gemini credential is missing.
    pub fn create_from_config(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
        match config {
            ProviderConfig::Gemini { model, base_url, .. } => {
                let api_key = config.api_key()?.unwrap_or_default();
                tracing::debug!(model = %model, "Creating Gemini provider");
                Ok(Arc::new(GeminiProvider::new(api_key, model.clone(), Some(base_url.clone()))))
            }
            ProviderConfig::Mock { responses_file } => {
                tracing::debug!(responses_file = ?responses_file, "Creating mock provider");
                Ok(Arc::new(MockProvider::new(responses_file.as_deref())))
            }
        }
    }
}
