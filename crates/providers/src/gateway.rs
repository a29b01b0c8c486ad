//! Conversation-level access to a [`Provider`].
//!
//! The gateway hides streaming: each call drains the provider stream into a
//! single reply string, mapping every failure into [`Error::Gateway`].

use crate::Provider;
use crate::prompts;
use crate::types::{CancelToken, ChatMessage, ChatRequest, Media, StreamEvent};
use futures::StreamExt;
use socratic_core::{Error, GenerationConfig, Result, Turn};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Handle to one dialogue with the model.
///
/// The model side is stateless, so the handle carries the full history that
/// gets replayed on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    id: Uuid,
    history: Vec<Turn>,
}

impl Conversation {
    /// Prime a conversation with prior turns, oldest first
    pub fn new(history: impl IntoIterator<Item = Turn>) -> Self {
        Self { id: Uuid::new_v4(), history: history.into_iter().collect() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}

pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    generation: GenerationConfig,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn Provider>, generation: GenerationConfig) -> Self {
        Self { provider, generation }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Open a conversation whose history replays `seed` in order
    pub fn open_conversation(&self, seed: impl IntoIterator<Item = Turn>) -> Conversation {
        let conversation = Conversation::new(seed);
        tracing::debug!(conversation = %conversation.id, turns = conversation.history.len(), "Opened conversation");
        conversation
    }

    /// Send one user turn and wait for the full reply.
    ///
    /// The conversation history only grows when a non-empty reply arrives.
    #[instrument(skip(self, conversation, text), fields(conversation = %conversation.id, history = conversation.history.len()))]
    pub async fn send(&self, conversation: &mut Conversation, text: &str) -> Result<String> {
        let messages = std::iter::once(ChatMessage::system(prompts::tutor_instruction()))
            .chain(conversation.history.iter().map(ChatMessage::from))
            .chain(std::iter::once(ChatMessage::user(text)))
            .collect();
        let request = ChatRequest::builder().messages(messages).generation(&self.generation).build();

        let reply = self.collect_reply(request).await?;
        conversation.history.push(Turn::user(text));
        conversation.history.push(Turn::assistant(reply.clone()));
        Ok(reply)
    }

    /// One-shot generation with the explainer instruction; no conversation state
    #[instrument(skip(self, prompt, media), fields(attachments = media.len()))]
    pub async fn generate(&self, prompt: &str, media: Vec<Media>) -> Result<String> {
        let request = ChatRequest::builder()
            .add_message(ChatMessage::system(prompts::explainer_instruction()))
            .add_message(ChatMessage::user(prompt).with_media(media))
            .generation(&self.generation)
            .build();

        self.collect_reply(request).await
    }

    async fn collect_reply(&self, request: ChatRequest) -> Result<String> {
        let mut stream = self
            .provider
            .stream_chat(request, CancelToken::new())
            .await
            .map_err(|e| Error::Gateway(e.to_string()))?;

        let mut reply = String::new();
        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::Token(token) => reply.push_str(&token),
                StreamEvent::Done => break,
                StreamEvent::Error(message) => {
                    tracing::warn!(provider = self.provider.name(), error = %message, "Model call failed");
                    return Err(Error::Gateway(message));
                }
            }
        }

        if reply.trim().is_empty() {
            tracing::warn!(provider = self.provider.name(), "Model returned an empty reply");
            return Err(Error::Gateway("model returned an empty reply".to_string()));
        }

        tracing::debug!(chars = reply.chars().count(), "Reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockProvider, MockResponse};
    use crate::types::Role;
    use futures::stream::Stream;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply
    struct RecordingProvider {
        reply: String,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: reply.to_string(), requests: Mutex::new(Vec::new()) })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Provider for RecordingProvider {
        async fn stream_chat<'a>(
            &'a self, request: ChatRequest, _cancel_token: CancelToken,
        ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
            self.requests.lock().unwrap().push(request);
            let events = vec![StreamEvent::Token(self.reply.clone()), StreamEvent::Done];
            Ok(Box::pin(futures::stream::iter(events)))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn gateway(provider: Arc<dyn Provider>) -> ModelGateway {
        ModelGateway::new(provider, GenerationConfig::default())
    }

    #[test]
    fn test_open_conversation_keeps_seed_order() {
        let gateway = gateway(Arc::new(MockProvider::new(None)));
        let seed = vec![Turn::assistant("Hi"), Turn::user("bubble sort"), Turn::assistant("What is a pass?")];

        let conversation = gateway.open_conversation(seed.clone());
        assert_eq!(conversation.history(), seed.as_slice());

        let other = gateway.open_conversation(seed);
        assert_ne!(conversation.id(), other.id());
    }

    #[tokio::test]
    async fn test_send_replays_history_and_grows_it() {
        let provider = RecordingProvider::new("What happens after the first pass?");
        let gateway = gateway(provider.clone());
        let mut conversation = gateway.open_conversation(vec![Turn::assistant("Hi")]);

        let reply = gateway.send(&mut conversation, "explain bubble sort").await.unwrap();
        assert_eq!(reply, "What happens after the first pass?");

        let requests = provider.requests();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Socratic"));
        assert_eq!((messages[1].role, messages[1].content.as_str()), (Role::Assistant, "Hi"));
        assert_eq!((messages[2].role, messages[2].content.as_str()), (Role::User, "explain bubble sort"));
        assert_eq!(requests[0].top_k, Some(64));

        assert_eq!(
            conversation.history(),
            &[Turn::assistant("Hi"), Turn::user("explain bubble sort"), Turn::assistant(reply)]
        );
    }

    #[tokio::test]
    async fn test_send_failure_leaves_history_untouched() {
        let provider = Arc::new(MockProvider::with_responses(vec![MockResponse::Error {
            message: "quota exceeded".to_string(),
        }]));
        let gateway = gateway(provider);
        let mut conversation = gateway.open_conversation(vec![Turn::assistant("Hi")]);

        let err = gateway.send(&mut conversation, "why?").await.unwrap_err();
        assert!(matches!(err, Error::Gateway(ref msg) if msg == "quota exceeded"));
        assert_eq!(conversation.history().len(), 1);
    }

    #[tokio::test]
    async fn test_send_empty_reply_is_gateway_error() {
        let gateway = gateway(RecordingProvider::new("   "));
        let mut conversation = gateway.open_conversation(vec![Turn::assistant("Hi")]);

        assert!(matches!(gateway.send(&mut conversation, "hello").await, Err(Error::Gateway(_))));
        assert_eq!(conversation.history().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_uses_explainer_instruction_and_media() {
        let provider = RecordingProvider::new("Each pass bubbles the largest value to the end.");
        let gateway = gateway(provider.clone());

        let media = vec![Media::new("image/jpeg", vec![0xff, 0xd8])];
        let text = gateway.generate("Explain bubble sort visualizations with image", media.clone()).await.unwrap();
        assert!(text.starts_with("Each pass"));

        let requests = provider.requests();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Explain visualization thoroughly");
        assert_eq!(messages[1].media, media);
    }

    #[tokio::test]
    async fn test_send_leads_with_tutor_instruction() {
        let provider = RecordingProvider::new("ok");
        let gateway = gateway(provider.clone());
        let mut conversation = gateway.open_conversation(Vec::new());

        gateway.send(&mut conversation, "hi").await.unwrap();
        assert_eq!(provider.requests()[0].messages[0].content, prompts::tutor_instruction());
    }
}
