use socratic_core::Transcript;
use socratic_providers::Conversation;

/// Which screen the user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Chat,
    Learn,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Chat => "chat",
            Page::Learn => "learn",
        }
    }
}

/// How chat input is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Type,
    Voice,
}

impl InputMode {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "type" | "text" => Some(InputMode::Type),
            "voice" | "speech" => Some(InputMode::Voice),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Type => "type",
            InputMode::Voice => "voice",
        }
    }
}

/// A started or loaded chat
#[derive(Debug, Clone)]
pub struct ActiveChat {
    pub topic: String,
    pub transcript: Transcript,
    pub conversation: Conversation,
}

/// Topic, transcript and conversation exist together or not at all
#[derive(Debug, Clone, Default)]
pub enum ChatState {
    #[default]
    Idle,
    Active(ActiveChat),
}

impl ChatState {
    pub fn is_active(&self) -> bool {
        matches!(self, ChatState::Active(_))
    }
}

/// Working set for the single user session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub chat: ChatState,
    pub page: Page,
    pub input_mode: InputMode,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_topic(&self) -> Option<&str> {
        match &self.chat {
            ChatState::Active(chat) => Some(&chat.topic),
            ChatState::Idle => None,
        }
    }

    /// Working transcript; empty when no chat is active
    pub fn current_transcript(&self) -> &Transcript {
        static EMPTY: Transcript = Transcript::new();
        match &self.chat {
            ChatState::Active(chat) => &chat.transcript,
            ChatState::Idle => &EMPTY,
        }
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        match &self.chat {
            ChatState::Active(chat) => Some(&chat.conversation),
            ChatState::Idle => None,
        }
    }
}
