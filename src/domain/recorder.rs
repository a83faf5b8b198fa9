use crate::infrastructure::audio::{
    AudioBackend, AudioBackendError, AudioData, AudioFormat, resolve_capture_format,
};

/// `AudioBackend` の薄いラッパ。録音フォーマットの解決をまとめ、ドメイン層に録音 I/F を提供する。
pub struct Recorder<T: AudioBackend> {
    backend: T,
    preferences: Vec<AudioFormat>,
}

impl<T: AudioBackend> Recorder<T> {
    /// バックエンドと優先フォーマットを注入して新しい `Recorder` を作成。
    pub fn new(backend: T, preferences: Vec<AudioFormat>) -> Self {
        Self {
            backend,
            preferences,
        }
    }

    /// 実際に使う録音フォーマット
    pub fn capture_format(&self) -> Option<AudioFormat> {
        resolve_capture_format(&self.preferences, self.backend.supported_formats())
    }

    /// 録音を開始します。
    pub fn start(&self) -> Result<AudioFormat, AudioBackendError> {
        let format = self.capture_format().ok_or_else(|| {
            AudioBackendError::DeviceUnavailable("backend reports no capture formats".into())
        })?;
        self.backend.start_recording(format)?;
        Ok(format)
    }

    /// 録音を停止し、音声データを返します。
    pub fn stop(&self) -> Result<AudioData, AudioBackendError> {
        self.backend.stop_recording()
    }

    /// 録音中かどうかを返します。
    pub fn is_recording(&self) -> bool {
        self.backend.is_recording()
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }
}
