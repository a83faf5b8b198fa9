use super::message::{HistoryEntry, Message};

/// 起動時にログの先頭へ置く挨拶文
pub const DEFAULT_GREETING: &str = "Hello! I'm your Selcom assistant. How can I help you today?";

/// 時系列順のメッセージ列。追加のみ可能で、編集・削除は行わない。
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// 挨拶メッセージ 1 件から始まるログを作成
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting, Vec::new())],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// 2 件を連続して追加する（音声フローの user + assistant）
    pub fn push_turn(&mut self, user: Message, assistant: Message) {
        self.messages.reserve(2);
        self.messages.push(user);
        self.messages.push(assistant);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 現時点の履歴スナップショット。呼び出しごとに新しく作り直す。
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.messages.iter().map(Message::to_history_entry).collect()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }
}
