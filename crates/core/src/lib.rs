pub mod config;
pub mod error;
pub mod lessons;
pub mod logging;
pub mod transcript;

pub use config::{
    AssetsConfig, ChatConfig, Config, ConfigError, GenerationConfig, ProviderConfig, ProviderKind, VoiceConfig,
};
pub use error::{Error, Result, SessionError};
pub use lessons::{LESSONS, Lesson, find_lesson};
pub use transcript::{Speaker, Transcript, Turn};
