use crate::explainer::{Explanation, LessonExplainer};
use crate::state::{ActiveChat, ChatState, InputMode, Page, SessionState};

use socratic_core::logging::{PrivacyConfig, redact_text};
use socratic_core::{Error, Lesson, Result, SessionError, Transcript, Turn};
use socratic_providers::ModelGateway;
use socratic_store::TranscriptStore;
use std::path::PathBuf;
use tracing::instrument;

/// Drives one tutoring session: chat lifecycle, saved chats and page navigation.
///
/// Every mutation goes through `&mut self`; there is exactly one owner.
pub struct SessionController {
    state: SessionState,
    store: TranscriptStore,
    gateway: ModelGateway,
    opening_message: String,
    assets_dir: PathBuf,
    privacy: PrivacyConfig,
}

impl SessionController {
    pub fn new(gateway: ModelGateway, opening_message: impl Into<String>) -> Self {
        Self {
            state: SessionState::new(),
            store: TranscriptStore::new(),
            gateway,
            opening_message: opening_message.into(),
            assets_dir: PathBuf::from("assets"),
            privacy: PrivacyConfig::default(),
        }
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub fn opening_message(&self) -> &str {
        &self.opening_message
    }

    /// Start a new chat seeded with the opening message.
    ///
    /// An active chat has to be ended first.
    pub fn start(&mut self, topic: &str) -> Result<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::Validation("topic must not be empty".to_string()));
        }
        if let Some(current) = self.state.current_topic() {
            return Err(SessionError::AlreadyActive(current.to_string()).into());
        }

        let seed = Turn::assistant(self.opening_message.clone());
        let conversation = self.gateway.open_conversation([seed.clone()]);
        let transcript: Transcript = vec![seed].into();

        tracing::info!(topic, conversation = %conversation.id(), "Chat started");
        self.state.chat = ChatState::Active(ActiveChat { topic: topic.to_string(), transcript, conversation });
        Ok(())
    }

    /// Record a user turn and the model's reply.
    ///
    /// When the model call fails the user turn stays in the transcript without
    /// a reply; [`retry_last`](Self::retry_last) can complete it later.
    #[instrument(skip(self, user_text))]
    pub async fn submit(&mut self, user_text: &str) -> Result<String> {
        let ChatState::Active(chat) = &mut self.state.chat else {
            return Err(SessionError::NoActiveChat.into());
        };
        if user_text.trim().is_empty() {
            return Err(Error::Validation("message must not be empty".to_string()));
        }

        tracing::debug!(topic = %chat.topic, text = %redact_text(user_text, &self.privacy), "Submitting turn");
        chat.transcript.push(Turn::user(user_text));

        match self.gateway.send(&mut chat.conversation, user_text).await {
            Ok(reply) => {
                chat.transcript.push(Turn::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(topic = %chat.topic, error = %e, "Reply failed; user turn awaits a retry");
                Err(e)
            }
        }
    }

    /// Re-send the last user turn of a transcript still waiting for a reply
    #[instrument(skip(self))]
    pub async fn retry_last(&mut self) -> Result<String> {
        let ChatState::Active(chat) = &mut self.state.chat else {
            return Err(SessionError::NoActiveChat.into());
        };
        let pending = match chat.transcript.last() {
            Some(turn) if chat.transcript.awaiting_reply() => turn.text().to_string(),
            _ => return Err(Error::Validation("nothing to retry; the last turn already has a reply".to_string())),
        };

        // A transcript loaded while awaiting a reply already replays the pending turn.
        if chat.conversation.history().last().is_some_and(|turn| turn.speaker() == socratic_core::Speaker::User) {
            let answered = &chat.transcript.turns()[..chat.transcript.len() - 1];
            chat.conversation = self.gateway.open_conversation(answered.iter().cloned());
        }

        tracing::debug!(topic = %chat.topic, "Retrying last turn");
        match self.gateway.send(&mut chat.conversation, &pending).await {
            Ok(reply) => {
                chat.transcript.push(Turn::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(topic = %chat.topic, error = %e, "Retry failed");
                Err(e)
            }
        }
    }

    /// Save the working transcript under the current topic, overwriting any previous save
    pub fn save_current(&mut self) -> Result<()> {
        let ChatState::Active(chat) = &self.state.chat else {
            return Err(Error::Validation("Start a chat to enable saving.".to_string()));
        };
        if chat.transcript.is_empty() {
            return Err(Error::Validation("nothing to save yet".to_string()));
        }

        self.store.save(&chat.topic, chat.transcript.clone());
        tracing::info!(topic = %chat.topic, turns = chat.transcript.len(), "Chat saved");
        Ok(())
    }

    /// Resume a saved chat, replacing whatever is active
    pub fn load(&mut self, topic: &str) -> Result<()> {
        let transcript = self.store.load(topic)?;
        let conversation = self.gateway.open_conversation(transcript.iter().cloned());

        if let Some(previous) = self.state.current_topic() {
            tracing::debug!(previous, "Replacing active chat");
        }
        tracing::info!(topic, turns = transcript.len(), conversation = %conversation.id(), "Chat loaded");
        self.state.chat = ChatState::Active(ActiveChat { topic: topic.to_string(), transcript, conversation });
        Ok(())
    }

    /// Drop the active chat without saving. Safe to call when idle.
    pub fn end(&mut self) {
        if let ChatState::Active(chat) = std::mem::take(&mut self.state.chat) {
            tracing::info!(topic = %chat.topic, turns = chat.transcript.len(), "Chat ended");
        }
    }

    pub fn delete_saved(&mut self, topic: &str) -> Result<()> {
        self.store.delete(topic)?;
        tracing::info!(topic, "Saved chat deleted");
        Ok(())
    }

    pub fn delete_all_saved(&mut self) {
        self.store.clear();
        tracing::info!("All saved chats deleted");
    }

    pub fn saved_topics(&self) -> Vec<String> {
        self.store.list_topics()
    }

    pub fn open_learn_page(&mut self) {
        self.state.page = Page::Learn;
    }

    pub fn back_to_chat(&mut self) {
        self.state.page = Page::Chat;
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.state.input_mode = mode;
    }

    /// Ask the model to explain a lesson's visualization
    pub async fn explain(&self, lesson: &Lesson) -> Result<Explanation> {
        LessonExplainer::new(&self.gateway, &self.assets_dir).explain(lesson).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::Stream;
    use socratic_core::{GenerationConfig, Speaker};
    use socratic_providers::{
        CancelToken, ChatRequest, MockProvider, MockResponse, Provider, Role, StreamEvent,
    };
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    const OPENING: &str = "Hey! I'm your assistant. What would you like to learn about sorting algorithms today?";

    /// Answers each request with the next scripted outcome and records what it was sent
    struct ScriptedProvider {
        outcomes: Mutex<Vec<std::result::Result<String, String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<std::result::Result<&str, &str>>) -> Arc<Self> {
            let mut outcomes: Vec<_> =
                outcomes.into_iter().map(|o| o.map(str::to_string).map_err(str::to_string)).collect();
            outcomes.reverse();
            Arc::new(Self { outcomes: Mutex::new(outcomes), requests: Mutex::new(Vec::new()) })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        async fn stream_chat<'a>(
            &'a self, request: ChatRequest, _cancel_token: CancelToken,
        ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
            self.requests.lock().unwrap().push(request);
            let outcome = self.outcomes.lock().unwrap().pop().unwrap_or_else(|| Ok("Why do you think so?".to_string()));
            let events = match outcome {
                Ok(text) => vec![StreamEvent::Token(text), StreamEvent::Done],
                Err(message) => vec![StreamEvent::Error(message)],
            };
            Ok(Box::pin(futures::stream::iter(events)))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn controller(provider: Arc<dyn Provider>) -> SessionController {
        SessionController::new(ModelGateway::new(provider, GenerationConfig::default()), OPENING)
    }

    fn mock_controller() -> SessionController {
        controller(Arc::new(MockProvider::with_responses(vec![MockResponse::Text {
            content: "What happens to the largest element after one pass?".to_string(),
        }])))
    }

    #[test]
    fn test_start_seeds_opening_turn() {
        let mut controller = mock_controller();
        controller.start("  Sorting Basics ").unwrap();

        let state = controller.state();
        assert_eq!(state.current_topic(), Some("Sorting Basics"));
        assert_eq!(state.current_transcript().turns(), &[Turn::assistant(OPENING)]);
        assert_eq!(state.active_conversation().unwrap().history(), &[Turn::assistant(OPENING)]);
    }

    #[test]
    fn test_start_rejects_empty_topic() {
        let mut controller = mock_controller();
        assert!(matches!(controller.start("   "), Err(Error::Validation(_))));
        assert!(!controller.state().chat.is_active());
    }

    #[test]
    fn test_start_over_active_chat_is_refused() {
        let mut controller = mock_controller();
        controller.start("Heaps").unwrap();

        let err = controller.start("Quicksort").unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::AlreadyActive(ref t)) if t == "Heaps"));
        assert_eq!(controller.state().current_topic(), Some("Heaps"));

        controller.end();
        controller.start("Quicksort").unwrap();
        assert_eq!(controller.state().current_topic(), Some("Quicksort"));
    }

    #[test]
    fn test_start_then_end_resets_everything() {
        let mut controller = mock_controller();
        controller.start("Heaps").unwrap();
        controller.end();

        let state = controller.state();
        assert!(state.current_topic().is_none());
        assert!(state.current_transcript().is_empty());
        assert!(state.active_conversation().is_none());

        controller.end();
        assert!(controller.state().current_topic().is_none());
    }

    #[tokio::test]
    async fn test_submit_appends_user_and_reply() {
        let mut controller = mock_controller();
        controller.start("Bubble").unwrap();

        let reply = controller.submit("explain bubble sort").await.unwrap();
        assert_eq!(reply, "What happens to the largest element after one pass?");

        let turns = controller.state().current_transcript().turns().to_vec();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1], Turn::user("explain bubble sort"));
        assert_eq!(turns[2].speaker(), Speaker::Assistant);
    }

    #[tokio::test]
    async fn test_submit_requires_active_chat() {
        let mut controller = mock_controller();
        let err = controller.submit("hello").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NoActiveChat)));
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_input() {
        let mut controller = mock_controller();
        controller.start("Bubble").unwrap();

        assert!(matches!(controller.submit("  \n").await, Err(Error::Validation(_))));
        assert_eq!(controller.state().current_transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_user_turn_and_retry_completes_it() {
        let provider = ScriptedProvider::new(vec![Err("quota exceeded"), Ok("Which elements get compared first?")]);
        let mut controller = controller(provider.clone());
        controller.start("Bubble").unwrap();

        let err = controller.submit("explain bubble sort").await.unwrap_err();
        assert!(matches!(err, Error::Gateway(ref msg) if msg == "quota exceeded"));

        let transcript = controller.state().current_transcript();
        assert_eq!(transcript.len(), 2);
        assert!(transcript.awaiting_reply());
        assert_eq!(controller.state().active_conversation().unwrap().history().len(), 1);

        let reply = controller.retry_last().await.unwrap();
        assert_eq!(reply, "Which elements get compared first?");

        let transcript = controller.state().current_transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[1], Turn::user("explain bubble sort"));
        assert!(!transcript.awaiting_reply());

        let last_request = provider.requests().pop().unwrap();
        let users: Vec<_> = last_request.messages.iter().filter(|m| m.role == Role::User).collect();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_without_pending_turn_is_rejected() {
        let mut controller = mock_controller();
        assert!(matches!(controller.retry_last().await, Err(Error::Session(SessionError::NoActiveChat))));

        controller.start("Bubble").unwrap();
        assert!(matches!(controller.retry_last().await, Err(Error::Validation(_))));
    }

    #[test]
    fn test_save_requires_active_chat() {
        let mut controller = mock_controller();

        let err = controller.save_current().unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == "Start a chat to enable saving."));
        assert!(controller.store().is_empty());
    }

    #[tokio::test]
    async fn test_load_then_submit_appends_two_turns() {
        let provider = ScriptedProvider::new(vec![Ok("Where does the pivot end up?"), Ok("Good. And then?")]);
        let mut controller = controller(provider.clone());
        controller.start("Quick Sort").unwrap();
        controller.submit("how does quicksort work").await.unwrap();
        controller.save_current().unwrap();
        controller.end();

        controller.load("Quick Sort").unwrap();
        let loaded = controller.state().current_transcript().len();
        assert_eq!(loaded, 3);

        controller.submit("it ends in its final position").await.unwrap();
        assert_eq!(controller.state().current_transcript().len(), loaded + 2);
        assert_eq!(controller.store().load("Quick Sort").unwrap().len(), loaded);

        let replayed: Vec<(Role, String)> = provider.requests()[1]
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| (m.role, m.content.clone()))
            .collect();
        assert_eq!(
            replayed,
            vec![
                (Role::Assistant, OPENING.to_string()),
                (Role::User, "how does quicksort work".to_string()),
                (Role::Assistant, "Where does the pivot end up?".to_string()),
                (Role::User, "it ends in its final position".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_missing_topic() {
        let mut controller = mock_controller();
        assert!(matches!(controller.load("Heaps"), Err(Error::NotFound(ref t)) if t == "Heaps"));
        assert!(!controller.state().chat.is_active());
    }

    #[tokio::test]
    async fn test_load_replaces_active_chat() {
        let mut controller = mock_controller();
        controller.start("Saved").unwrap();
        controller.save_current().unwrap();
        controller.end();

        controller.start("Scratch").unwrap();
        controller.submit("hello").await.unwrap();
        controller.load("Saved").unwrap();

        assert_eq!(controller.state().current_topic(), Some("Saved"));
        assert_eq!(controller.state().current_transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_loading_pending_transcript() {
        let provider = ScriptedProvider::new(vec![Err("timeout"), Ok("Try a smaller array.")]);
        let mut controller = controller(provider.clone());
        controller.start("Merge").unwrap();
        controller.submit("why split in half").await.unwrap_err();
        controller.save_current().unwrap();
        controller.end();

        controller.load("Merge").unwrap();
        controller.retry_last().await.unwrap();

        let last_request = provider.requests().pop().unwrap();
        let users: Vec<_> = last_request.messages.iter().filter(|m| m.role == Role::User).collect();
        assert_eq!(users.len(), 1);
        assert_eq!(controller.state().current_transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_sorting_basics_scenario() {
        let mut controller = mock_controller();
        controller.start("Sorting Basics").unwrap();
        controller.save_current().unwrap();

        controller.submit("explain bubble sort").await.unwrap();
        controller.save_current().unwrap();
        assert_eq!(controller.store().load("Sorting Basics").unwrap().len(), 3);

        controller.delete_saved("Sorting Basics").unwrap();
        assert!(!controller.saved_topics().contains(&"Sorting Basics".to_string()));
        assert!(matches!(controller.load("Sorting Basics"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_all_and_listing_order() {
        let mut controller = mock_controller();
        for topic in ["Merge", "Bubble", "Heap"] {
            controller.start(topic).unwrap();
            controller.save_current().unwrap();
            controller.end();
        }
        assert_eq!(controller.saved_topics(), vec!["Merge", "Bubble", "Heap"]);

        assert!(matches!(controller.delete_saved("Radix"), Err(Error::NotFound(_))));

        controller.delete_all_saved();
        assert!(controller.saved_topics().is_empty());
    }

    #[test]
    fn test_end_does_not_save() {
        let mut controller = mock_controller();
        controller.start("Heaps").unwrap();
        controller.end();
        assert!(controller.saved_topics().is_empty());
    }

    #[test]
    fn test_page_navigation_and_input_mode() {
        let mut controller = mock_controller();
        controller.start("Heaps").unwrap();

        controller.open_learn_page();
        assert_eq!(controller.state().page, Page::Learn);
        assert_eq!(controller.state().current_topic(), Some("Heaps"));

        controller.back_to_chat();
        assert_eq!(controller.state().page, Page::Chat);

        controller.set_input_mode(InputMode::Voice);
        assert_eq!(controller.state().input_mode, InputMode::Voice);
    }
}
