//! 結合テスト共通のモック実装
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use voice_chat::application::{ChatClient, ChatSession, TranscriptionClient};
use voice_chat::domain::{ChatReply, HistoryEntry, Recorder, Transcription};
use voice_chat::error::{ChatError, Result};
use voice_chat::infrastructure::audio::{AudioBackend, AudioBackendError, AudioData, AudioFormat};

/// `gate` が設定されていれば、通知されるまで応答を保留する
async fn wait_for(gate: &Option<Arc<Notify>>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

/// 受け取ったリクエストを記録し、用意した応答を順に返すチャットクライアント
#[derive(Clone, Default)]
pub struct ScriptedChat {
    pub replies: Arc<Mutex<VecDeque<Result<ChatReply>>>>,
    pub requests: Arc<Mutex<Vec<(String, Vec<HistoryEntry>)>>>,
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<Result<ChatReply>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Self::default()
        }
    }

    /// 応答を `gate` の通知まで保留する
    pub fn gated(self, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..self
        }
    }

    pub fn requests(&self) -> Vec<(String, Vec<HistoryEntry>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn send_message(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply> {
        self.requests
            .lock()
            .unwrap()
            .push((message.to_string(), history.to_vec()));
        wait_for(&self.gate).await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::text(format!("echo: {message}"))))
    }
}

/// 受け取った音声と履歴を記録する文字起こしクライアント
#[derive(Clone)]
pub struct ScriptedTranscriber {
    pub result: Arc<Mutex<Option<Result<Transcription>>>>,
    pub calls: Arc<Mutex<Vec<(AudioData, Vec<HistoryEntry>)>>>,
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedTranscriber {
    pub fn new(result: Result<Transcription>) -> Self {
        Self {
            result: Arc::new(Mutex::new(Some(result))),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// 文字起こし結果を `gate` の通知まで保留する
    pub fn gated(self, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..self
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranscriptionClient for ScriptedTranscriber {
    async fn transcribe(&self, audio: AudioData, history: &[HistoryEntry]) -> Result<Transcription> {
        self.calls.lock().unwrap().push((audio, history.to_vec()));
        wait_for(&self.gate).await;
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ChatError::InvalidResponse("no scripted result".into())))
    }
}

/// テスト用のモックオーディオバックエンド
#[derive(Clone)]
pub struct MockAudioBackend {
    pub recording: Arc<AtomicBool>,
    pub releases: Arc<AtomicUsize>,
    pub captured: Vec<u8>,
    pub deny: bool,
}

impl MockAudioBackend {
    pub fn with_capture(captured: Vec<u8>) -> Self {
        Self {
            recording: Arc::new(AtomicBool::new(false)),
            releases: Arc::new(AtomicUsize::new(0)),
            captured,
            deny: false,
        }
    }

    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::with_capture(Vec::new())
        }
    }
}

impl AudioBackend for MockAudioBackend {
    fn supported_formats(&self) -> &[AudioFormat] {
        &[AudioFormat::Wav, AudioFormat::Flac]
    }

    fn start_recording(&self, _format: AudioFormat) -> std::result::Result<(), AudioBackendError> {
        if self.deny {
            return Err(AudioBackendError::DeviceUnavailable(
                "permission denied".into(),
            ));
        }
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_recording(&self) -> std::result::Result<AudioData, AudioBackendError> {
        self.recording.store(false, Ordering::SeqCst);
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(AudioData::new(self.captured.clone(), "audio/wav"))
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

pub fn session_with(
    chat: ScriptedChat,
    transcriber: ScriptedTranscriber,
    backend: MockAudioBackend,
) -> ChatSession<MockAudioBackend> {
    ChatSession::new(
        Box::new(chat),
        Box::new(transcriber),
        Recorder::new(backend, vec![AudioFormat::Webm, AudioFormat::Wav]),
    )
}

pub fn http_500() -> ChatError {
    ChatError::Network {
        status: Some(500),
        detail: "API error: 500".into(),
    }
}
