//! External collaborator seams: room setup, persistence, notifications

pub mod notify;
pub mod persist;
pub mod room;

pub use notify::{LogSink, NoteLevel, NotificationSink, NullSink, RecordingSink};
pub use persist::{ActionRecord, GameResults, GameStore, MemoryStore};
pub use room::RoomSetup;
