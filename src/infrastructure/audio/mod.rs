use thiserror::Error;

pub mod cpal_backend;
pub mod encoder;
pub mod format;

pub use cpal_backend::{CpalAudioBackend, list_input_devices};
pub use encoder::AudioEncodeError;
pub use format::{AudioFormat, resolve_capture_format};

/// 録音済みの音声データ（メモリ保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub bytes: Vec<u8>,
    /// エンコード済みメディアタイプ（例: `audio/wav`）
    pub mime_type: String,
}

impl AudioData {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// アップロード時のファイル名。メディアタイプから拡張子を推定する。
    pub fn upload_file_name(&self) -> String {
        format::upload_file_name(&self.mime_type)
    }
}

#[derive(Debug, Error)]
pub enum AudioBackendError {
    #[error("no input device available: {0}")]
    DeviceUnavailable(String),

    #[error("failed to open input stream: {0}")]
    StreamBuild(String),

    #[error("already recording")]
    AlreadyRecording,

    #[error("not recording")]
    NotRecording,

    #[error("capture format {0} is not supported by this backend")]
    UnsupportedFormat(AudioFormat),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error(transparent)]
    Encode(#[from] AudioEncodeError),
}

/// 録音デバイス抽象。
/// 実装は `start_recording`→`stop_recording` が 1 対で呼ばれることを前提とする。
/// `stop_recording` はエラー時を含め、必ずデバイスを解放してから戻ること。
pub trait AudioBackend {
    /// このバックエンドが出力できるフォーマット（先頭がデフォルト）
    fn supported_formats(&self) -> &[AudioFormat];

    /// 指定フォーマットで録音を開始。
    fn start_recording(&self, format: AudioFormat) -> Result<(), AudioBackendError>;

    /// 録音を停止し、エンコード済みの音声データを返します。
    /// 何も録音できなかった場合は空のバイト列を返します。
    fn stop_recording(&self) -> Result<AudioData, AudioBackendError>;

    /// 現在録音中であれば `true`。
    fn is_recording(&self) -> bool;
}
