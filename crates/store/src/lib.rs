//! In-memory store of saved conversations
//!
//! Saved chats live only as long as the hosting process; nothing is written
//! to disk. Topics are listed in the order they were first saved.
//!
//! # Example
//!
//! ```
//! use socratic_core::{Transcript, Turn};
//! use socratic_store::TranscriptStore;
//!
//! let mut store = TranscriptStore::new();
//! let transcript: Transcript = vec![Turn::assistant("Hi")].into();
//! store.save("Sorting Basics", transcript.clone());
//!
//! assert_eq!(store.load("Sorting Basics")?, transcript);
//! assert_eq!(store.list_topics(), vec!["Sorting Basics".to_string()]);
//! # Ok::<(), socratic_store::Error>(())
//! ```

mod error;
mod transcript_store;

pub use error::{Error, Result};
pub use transcript_store::{SavedChat, TranscriptStore};
