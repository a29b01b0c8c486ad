pub mod adapter;
pub mod gateway;
pub mod mock;
pub mod prompts;
pub mod types;

pub use adapter::{DEFAULT_GEMINI_BASE_URL, GeminiProvider, Provider, ProviderFactory};
pub use gateway::{Conversation, ModelGateway};
pub use mock::{MockEvent, MockProvider, MockResponse};
pub use prompts::{explainer_instruction, tutor_instruction};
pub use types::{CancelToken, ChatMessage, ChatRequest, Media, Role, StreamEvent, mime_type_for};

pub use socratic_core::{Error, Result};
