pub mod chat_session;
pub mod service_container;
pub mod traits;

pub use chat_session::{ChatSession, Outcome, Phase, RequestKind};
pub use service_container::{ServiceContainer, SessionSettings};
pub use traits::{ChatClient, TranscriptionClient};
