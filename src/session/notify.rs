//! Notification sink: human-readable feedback for a presentation layer
//!
//! The engine publishes strings here for UI toasts and never reads back;
//! correctness holds with no sink at all.

/// Severity the presentation layer maps to styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLevel {
    Success,
    Error,
    Info,
    Warning,
}

pub trait NotificationSink: Send + Sync {
    fn publish(&self, level: NoteLevel, message: &str);
}

/// Discards everything; the default for headless runs and tests
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _level: NoteLevel, _message: &str) {}
}

/// Routes notifications into the tracing output
pub struct LogSink;

impl NotificationSink for LogSink {
    fn publish(&self, level: NoteLevel, message: &str) {
        match level {
            NoteLevel::Error => tracing::error!(target: "magnate::notify", "{}", message),
            NoteLevel::Warning => tracing::warn!(target: "magnate::notify", "{}", message),
            NoteLevel::Success | NoteLevel::Info => {
                tracing::info!(target: "magnate::notify", "{}", message)
            }
        }
    }
}

/// Collects notifications in memory; used by tests to assert on feedback
#[derive(Default)]
pub struct RecordingSink {
    notes: std::sync::Mutex<Vec<(NoteLevel, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<(NoteLevel, String)> {
        self.notes.lock().expect("sink lock poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, level: NoteLevel, message: &str) {
        self.notes
            .lock()
            .expect("sink lock poisoned")
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_collects() {
        let sink = RecordingSink::new();
        sink.publish(NoteLevel::Success, "bought the tower");
        sink.publish(NoteLevel::Error, "not enough capital");

        let notes = sink.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].0, NoteLevel::Success);
        assert!(notes[1].1.contains("capital"));
    }

    #[test]
    fn test_null_sink_accepts_anything() {
        NullSink.publish(NoteLevel::Warning, "ignored");
    }
}
