//! サービスコンテナ
//!
//! # 責任
//! - 設定の解決（CLI / 環境変数 / 設定ファイル）
//! - セッションと依存関係の構築
//! - テスト時のモック注入サポート

use crate::application::ChatSession;
use crate::application::traits::{ChatClient, TranscriptionClient};
use crate::domain::{ConversationLog, DEFAULT_GREETING, Recorder};
use crate::infrastructure::audio::cpal_backend::parse_device_priority;
use crate::infrastructure::audio::{AudioBackend, AudioFormat, CpalAudioBackend};
use crate::infrastructure::config::{AppConfig, Mode, Overrides};
use crate::infrastructure::external::BackendClient;
use crate::utils::config::EnvConfig;

/// 解決済みのセッション設定
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub mode: Mode,
    pub base_url: String,
    pub capture_preferences: Vec<AudioFormat>,
    pub greeting: String,
    pub device_priority: Vec<String>,
}

impl SessionSettings {
    pub fn resolve(file: &AppConfig, env: &EnvConfig, overrides: &Overrides) -> Self {
        Self {
            mode: file.resolve_mode(env, overrides),
            base_url: file.resolve_base_url(env, overrides),
            capture_preferences: file.capture_preferences(),
            greeting: file
                .greeting
                .clone()
                .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
            device_priority: env
                .input_device_priority
                .as_deref()
                .map(parse_device_priority)
                .unwrap_or_default(),
        }
    }
}

/// サービスコンテナ
pub struct ServiceContainer<T: AudioBackend> {
    pub settings: SessionSettings,
    pub session: ChatSession<T>,
}

impl ServiceContainer<CpalAudioBackend> {
    /// 実バックエンド（HTTP + マイク）で構築
    pub fn new(settings: SessionSettings) -> Self {
        let backend = CpalAudioBackend::with_device_priority(settings.device_priority.clone());
        let client = BackendClient::new(&settings.base_url);
        Self::with_dependencies(
            settings,
            backend,
            Box::new(client.clone()),
            Box::new(client),
        )
    }
}

impl<T: AudioBackend> ServiceContainer<T> {
    /// 依存関係を注入して作成（テスト用）
    pub fn with_dependencies(
        settings: SessionSettings,
        backend: T,
        chat: Box<dyn ChatClient>,
        transcriber: Box<dyn TranscriptionClient>,
    ) -> Self {
        let recorder = Recorder::new(backend, settings.capture_preferences.clone());
        let log = ConversationLog::with_greeting(settings.greeting.clone());
        let session = ChatSession::with_log(log, chat, transcriber, recorder);
        Self { settings, session }
    }
}
