//! Session logic for the tutor: chat lifecycle, saved chats and the learn page.

pub mod controller;
pub mod explainer;
pub mod state;

pub use controller::SessionController;
pub use explainer::{Explanation, LessonExplainer};
pub use state::{ActiveChat, ChatState, InputMode, Page, SessionState};
