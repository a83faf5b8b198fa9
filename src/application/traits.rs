//! Application層の抽象化トレイト定義
//! 外部依存（バックエンド HTTP サービス）を抽象化し、テスト可能な構造を提供します

use crate::domain::{ChatReply, HistoryEntry, Transcription};
use crate::error::Result;
use crate::infrastructure::audio::AudioData;
use async_trait::async_trait;

/// チャットエンドポイントの抽象化
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// ユーザー発話と履歴を送信し、返信を受け取る
    async fn send_message(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply>;
}

/// ボイスノート（文字起こし + 返信）エンドポイントの抽象化
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    /// 録音データと履歴を送信する。空の録音はネットワークに出さずに失敗すること。
    async fn transcribe(&self, audio: AudioData, history: &[HistoryEntry])
    -> Result<Transcription>;
}
