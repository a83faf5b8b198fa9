//! 会話ログを構成するメッセージ型

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 発話者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// 旧名 `bot` も受け付け、送信時は常に `assistant` にする
    #[serde(alias = "bot")]
    Assistant,
}

impl Role {
    /// 役割名を正規化して解釈する。`bot` は `assistant` として扱う。
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" | "bot" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// 返信に添付される動画リンク
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLink {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl VideoLink {
    /// 表示ラベル。タイトルが無ければ URL を使う。
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.url,
        }
    }
}

/// 会話ログの 1 要素。追加後は変更されない。
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    timestamp: DateTime<Local>,
    video_links: Vec<VideoLink>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Vec::new())
    }

    pub fn assistant(content: impl Into<String>, video_links: Vec<VideoLink>) -> Self {
        Self::new(Role::Assistant, content, video_links)
    }

    fn new(role: Role, content: impl Into<String>, video_links: Vec<VideoLink>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
            video_links,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn video_links(&self) -> &[VideoLink] {
        &self.video_links
    }

    /// 履歴送信用の射影
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// バックエンドへ文脈として送る `{role, content}` の組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_bot_role_is_read_as_assistant() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"role":"bot","content":"hi"}"#).unwrap();
        assert_eq!(entry.role, Role::Assistant);

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn role_parse_normalizes_names() {
        assert_eq!(Role::parse("Bot"), Some(Role::Assistant));
        assert_eq!(Role::parse(" user "), Some(Role::User));
        assert_eq!(Role::parse("system"), None);
    }

    #[test]
    fn video_link_label_falls_back_to_url() {
        let titled = VideoLink {
            url: "https://example.com/v".into(),
            title: Some("How to pay".into()),
        };
        let untitled: VideoLink =
            serde_json::from_str(r#"{"url":"https://example.com/w"}"#).unwrap();
        assert_eq!(titled.label(), "How to pay");
        assert_eq!(untitled.label(), "https://example.com/w");
    }
}
