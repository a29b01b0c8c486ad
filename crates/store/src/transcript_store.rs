use crate::error::{Error, Result};

use chrono::{DateTime, Utc};
use socratic_core::Transcript;
use tracing::instrument;

/// One saved conversation
#[derive(Debug, Clone, PartialEq)]
pub struct SavedChat {
    /// Unique key chosen by the user
    pub topic: String,
    /// Turns as they were when last saved
    pub transcript: Transcript,
    /// Time of the most recent save
    pub saved_at: DateTime<Utc>,
}

/// Saved conversations keyed by topic.
///
/// Backed by a `Vec` so listing follows first-save order; re-saving a topic
/// replaces its transcript in place.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    entries: Vec<SavedChat>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `transcript` under `topic`, replacing any previous entry without merging.
    ///
    /// Callers gate empty topics and transcripts; the store accepts whatever it is given.
    #[instrument(skip(self, transcript), fields(turns = transcript.len()))]
    pub fn save(&mut self, topic: &str, transcript: Transcript) {
        let saved_at = Utc::now();
        match self.position(topic) {
            Some(index) => {
                tracing::debug!("Overwriting saved chat");
                let entry = &mut self.entries[index];
                entry.transcript = transcript;
                entry.saved_at = saved_at;
            }
            None => {
                tracing::debug!("Saving new chat");
                self.entries.push(SavedChat { topic: topic.to_string(), transcript, saved_at });
            }
        }
    }

    /// Copy of the transcript saved under `topic`
    pub fn load(&self, topic: &str) -> Result<Transcript> {
        self.get(topic).map(|entry| entry.transcript.clone())
    }

    pub fn get(&self, topic: &str) -> Result<&SavedChat> {
        self.entries
            .iter()
            .find(|entry| entry.topic == topic)
            .ok_or_else(|| Error::not_found(topic))
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, topic: &str) -> Result<()> {
        let index = self.position(topic).ok_or_else(|| Error::not_found(topic))?;
        self.entries.remove(index);
        tracing::debug!(remaining = self.entries.len(), "Deleted saved chat");
        Ok(())
    }

    pub fn clear(&mut self) {
        tracing::debug!(removed = self.entries.len(), "Clearing saved chats");
        self.entries.clear();
    }

    /// Topics in first-save order
    pub fn list_topics(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.topic.clone()).collect()
    }

    pub fn entries(&self) -> &[SavedChat] {
        &self.entries
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.position(topic).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, topic: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.topic == topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socratic_core::Turn;

    fn transcript(texts: &[&str]) -> Transcript {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| if i % 2 == 0 { Turn::assistant(*text) } else { Turn::user(*text) })
            .collect()
    }

    #[test]
    fn test_save_then_load_returns_equal_transcript() {
        let mut store = TranscriptStore::new();
        let saved = transcript(&["Hi", "explain bubble sort", "What does one pass do?"]);

        store.save("Sorting Basics", saved.clone());

        assert_eq!(store.load("Sorting Basics").unwrap(), saved);
    }

    #[test]
    fn test_load_missing_topic() {
        let store = TranscriptStore::new();
        assert_eq!(store.load("Heaps").unwrap_err(), Error::not_found("Heaps"));
    }

    #[test]
    fn test_delete_removes_topic() {
        let mut store = TranscriptStore::new();
        store.save("Heaps", transcript(&["Hi"]));

        store.delete("Heaps").unwrap();

        assert!(!store.contains("Heaps"));
        assert!(matches!(store.load("Heaps"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_delete_missing_topic() {
        let mut store = TranscriptStore::new();
        store.save("Heaps", transcript(&["Hi"]));

        assert_eq!(store.delete("Quicksort").unwrap_err(), Error::not_found("Quicksort"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_empties_listing() {
        let mut store = TranscriptStore::new();
        store.save("a", transcript(&["Hi"]));
        store.save("b", transcript(&["Hi", "hello"]));

        store.clear();

        assert!(store.list_topics().is_empty());
        assert!(store.is_empty());

        store.clear();
        assert!(store.list_topics().is_empty());
    }

    #[test]
    fn test_list_topics_in_insertion_order() {
        let mut store = TranscriptStore::new();
        for topic in ["Quick Sort", "Bubble Sort", "Merge Sort", "Heap Sort"] {
            store.save(topic, transcript(&["Hi"]));
        }

        assert_eq!(store.list_topics(), vec!["Quick Sort", "Bubble Sort", "Merge Sort", "Heap Sort"]);
    }

    #[test]
    fn test_overwrite_replaces_without_merge_and_keeps_position() {
        let mut store = TranscriptStore::new();
        store.save("first", transcript(&["Hi", "one", "two"]));
        store.save("second", transcript(&["Hi"]));

        let replacement = transcript(&["Hello again"]);
        store.save("first", replacement.clone());

        assert_eq!(store.len(), 2);
        assert_eq!(store.load("first").unwrap(), replacement);
        assert_eq!(store.list_topics(), vec!["first", "second"]);
    }

    #[test]
    fn test_overwrite_refreshes_saved_at() {
        let mut store = TranscriptStore::new();
        store.save("topic", transcript(&["Hi"]));
        let first = store.get("topic").unwrap().saved_at;

        store.save("topic", transcript(&["Hi", "more"]));
        assert!(store.get("topic").unwrap().saved_at >= first);
    }

    #[test]
    fn test_loaded_copy_is_independent() {
        let mut store = TranscriptStore::new();
        store.save("topic", transcript(&["Hi"]));

        let mut working = store.load("topic").unwrap();
        working.push(Turn::user("a new question"));

        assert_eq!(store.load("topic").unwrap().len(), 1);
        assert_eq!(working.len(), 2);
    }

    #[test]
    fn test_sorting_basics_scenario() {
        let mut store = TranscriptStore::new();
        store.save("Sorting Basics", transcript(&["Hi"]));
        store.save("Sorting Basics", transcript(&["Hi", "explain bubble sort", "..."]));
        assert_eq!(store.load("Sorting Basics").unwrap().len(), 3);

        store.delete("Sorting Basics").unwrap();

        assert!(!store.list_topics().contains(&"Sorting Basics".to_string()));
        assert!(matches!(store.load("Sorting Basics"), Err(Error::NotFound { .. })));
    }
}
