//! 統一エラーハンドリング
//!
//! このモジュールは voice_chat 全体で使用する統一エラー型を定義します。
//! セッション境界で全てのエラーを捕捉し、ユーザー向けの 1 行の文字列へ変換します。

use crate::application::chat_session::RequestKind;
use crate::infrastructure::audio::AudioBackendError;
use crate::infrastructure::audio::encoder::AudioEncodeError;
use thiserror::Error;

/// voice_chat 全体で使用する統一エラー型
#[derive(Debug, Error)]
pub enum ChatError {
    // ========================================
    // 通信関連エラー
    // ========================================
    /// 2xx 以外のステータス、またはトランスポート層の失敗
    #[error("{detail}")]
    Network { status: Option<u16>, detail: String },

    /// レスポンスボディが期待した形でない
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    // ========================================
    // 録音関連エラー
    // ========================================
    #[error("No audio captured")]
    EmptyCapture,

    #[error("{0}")]
    Permission(String),

    #[error("Recording not started")]
    RecordingNotStarted,

    #[error("Recording already active")]
    RecordingAlreadyActive,

    #[error("Audio backend error: {0}")]
    AudioBackend(String),

    // ========================================
    // 設定関連エラー
    // ========================================
    #[error("Configuration error: {0}")]
    Config(String),
}

/// 統一Result型エイリアス
pub type Result<T> = std::result::Result<T, ChatError>;

// ========================================
// 既存エラー型からの自動変換実装
// ========================================

impl From<reqwest::Error> for ChatError {
    fn from(error: reqwest::Error) -> Self {
        ChatError::Network {
            status: error.status().map(|s| s.as_u16()),
            detail: error.to_string(),
        }
    }
}

impl From<AudioBackendError> for ChatError {
    fn from(error: AudioBackendError) -> Self {
        match error {
            AudioBackendError::DeviceUnavailable(msg) | AudioBackendError::StreamBuild(msg) => {
                ChatError::Permission(msg)
            }
            AudioBackendError::AlreadyRecording => ChatError::RecordingAlreadyActive,
            AudioBackendError::NotRecording => ChatError::RecordingNotStarted,
            other => ChatError::AudioBackend(other.to_string()),
        }
    }
}

impl From<AudioEncodeError> for ChatError {
    fn from(error: AudioEncodeError) -> Self {
        ChatError::AudioBackend(error.to_string())
    }
}

// ========================================
// ヘルパー関数
// ========================================

impl ChatError {
    /// HTTP ステータスコード（取得できた場合）
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// ユーザーが再送すれば成功しうるエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChatError::Network { .. } | ChatError::InvalidResponse(_)
        )
    }

    /// セッションが表示するユーザー向けエラー文字列
    pub fn user_message(&self, kind: RequestKind) -> String {
        match self {
            ChatError::EmptyCapture => "No audio captured. Try again.".to_string(),
            ChatError::Permission(msg) => {
                format!("Microphone access denied or not available. {msg}")
            }
            other => match kind {
                RequestKind::Chat => format!("Failed to send message. Please try again. {other}"),
                RequestKind::Voice => format!("Failed to transcribe audio. {other}"),
            },
        }
    }
}
