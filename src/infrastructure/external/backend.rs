//! チャットバックエンドの HTTP クライアント
//! Application層の `ChatClient` / `TranscriptionClient` を実装する。

use crate::application::traits::{ChatClient, TranscriptionClient};
use crate::domain::{ChatReply, HistoryEntry, Transcription};
use crate::error::{ChatError, Result};
use crate::infrastructure::audio::{AudioData, AudioFormat};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Serialize;
use tracing::debug;

pub const CHAT_PATH: &str = "/api/v1/local";
pub const VOICENOTE_PATH: &str = "/api/v1/voicenote";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_history: &'a [HistoryEntry],
}

/// バックエンドへの接続。状態を持たないので複製して使い回せる。
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_PATH)
    }

    pub fn voicenote_url(&self) -> String {
        format!("{}{}", self.base_url, VOICENOTE_PATH)
    }
}

#[async_trait]
impl ChatClient for BackendClient {
    async fn send_message(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply> {
        let url = self.chat_url();
        debug!(%url, history_len = history.len(), "POST chat");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message,
                conversation_history: history,
            })
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "chat response");
        if !status.is_success() {
            return Err(ChatError::Network {
                status: Some(status.as_u16()),
                detail: format!("API error: {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TranscriptionClient for BackendClient {
    async fn transcribe(
        &self,
        audio: AudioData,
        history: &[HistoryEntry],
    ) -> Result<Transcription> {
        if audio.is_empty() {
            return Err(ChatError::EmptyCapture);
        }

        let file_name = audio.upload_file_name();
        let mime = AudioFormat::from_mime(&audio.mime_type)
            .unwrap_or(AudioFormat::Webm)
            .mime_type();
        let history_json = serde_json::to_string(history)
            .map_err(|e| ChatError::InvalidResponse(format!("history encode failed: {e}")))?;

        let url = self.voicenote_url();
        debug!(%url, bytes = audio.bytes.len(), %file_name, "POST voicenote");

        let file_part = multipart::Part::bytes(audio.bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("conversation_history", history_json);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), body_len = body.len(), "voicenote response");

        if !status.is_success() {
            return Err(ChatError::Network {
                status: Some(status.as_u16()),
                detail: format!("Transcription failed ({}): {}", status.as_u16(), body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_tolerate_trailing_slash() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.chat_url(), "http://localhost:8000/api/v1/local");
        assert_eq!(client.voicenote_url(), "http://localhost:8000/api/v1/voicenote");
    }

    #[test]
    fn chat_request_body_shape() {
        let history = vec![HistoryEntry::new(crate::domain::Role::User, "Hello")];
        let body = serde_json::to_value(ChatRequest {
            message: "Hello",
            conversation_history: &history,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Hello",
                "conversation_history": [{"role": "user", "content": "Hello"}]
            })
        );
    }

    /// 空の録音はネットワークに出ない（到達不能なアドレスでも即座に失敗する）
    #[tokio::test]
    async fn empty_capture_short_circuits() {
        let client = BackendClient::new("http://127.0.0.1:9");
        let result = client
            .transcribe(AudioData::new(Vec::new(), "audio/wav"), &[])
            .await;
        assert!(matches!(result, Err(ChatError::EmptyCapture)));
    }
}
