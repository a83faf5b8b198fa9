pub mod conversation;
pub mod message;
pub mod recorder;
pub mod reply;

pub use conversation::{ConversationLog, DEFAULT_GREETING};
pub use message::{HistoryEntry, Message, Role, VideoLink};
pub use recorder::Recorder;
pub use reply::{ChatReply, Transcription};
