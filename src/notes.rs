//! Observability notes.
//!
//! Notes are fire-and-forget: a sink never reports failure back to the
//! pipeline, and dropping a note only costs visibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A single audit note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub tags: BTreeSet<String>,
    pub recorded_at: DateTime<Utc>,
}

impl Note {
    pub fn new<I, S>(text: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            recorded_at: Utc::now(),
        }
    }
}

/// Destination for notes.
pub trait NoteSink: Send + Sync {
    fn note(&self, note: Note);
}

/// Writes notes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotes;

impl NoteSink for TracingNotes {
    fn note(&self, note: Note) {
        let tags: Vec<&str> = note.tags.iter().map(String::as_str).collect();
        info!(tags = ?tags, "{}", note.text);
    }
}

/// Forwards notes into a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotes {
    tx: mpsc::UnboundedSender<Note>,
}

impl ChannelNotes {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Note>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NoteSink for ChannelNotes {
    fn note(&self, note: Note) {
        if self.tx.send(note).is_err() {
            debug!("Note receiver closed, dropping note");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_tags_are_a_set() {
        let note = Note::new("hello", ["sentiment", "persona_1", "sentiment"]);
        assert_eq!(note.tags.len(), 2);
        assert!(note.tags.contains("persona_1"));
    }

    #[test]
    fn test_channel_notes_forward() {
        let (sink, mut rx) = ChannelNotes::new();
        sink.note(Note::new("first", ["a"]));
        sink.note(Note::new("second", ["b"]));

        assert_eq!(rx.try_recv().unwrap().text, "first");
        assert_eq!(rx.try_recv().unwrap().text, "second");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notes_survive_closed_receiver() {
        let (sink, rx) = ChannelNotes::new();
        drop(rx);
        // Must not panic
        sink.note(Note::new("lost", ["a"]));
    }
}
