//! バックエンドからの応答型

use super::message::VideoLink;
use serde::Deserialize;

/// チャットエンドポイントの応答
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// 欠落・null の場合は空
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video_links: Vec<VideoLink>,
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            video_links: Vec::new(),
            response_type: None,
            confidence: None,
            language: None,
        }
    }
}

/// ボイスノートエンドポイントの応答。文字起こし結果と返信を持つ。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcription {
    pub query: String,
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video_links: Vec<VideoLink>,
}

impl Transcription {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            video_links: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<VideoLink>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let links: Option<Vec<VideoLink>> = Option::deserialize(deserializer)?;
    Ok(links.unwrap_or_default())
}
