//! 録音フォーマットの選択とファイル名推定

use std::fmt;

/// アップロード時のファイル名の語幹
const UPLOAD_STEM: &str = "voicenote";

/// 対応する音声コンテナ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Webm,
    Mp4,
    Wav,
    Flac,
    Ogg,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Ogg => "audio/ogg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "webm",
            AudioFormat::Mp4 => "m4a",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
        }
    }

    /// メディアタイプ文字列から推定する。`audio/webm;codecs=opus` のような
    /// パラメータ付きの値も受け付ける。
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("mp4") || mime.contains("m4a") {
            Some(AudioFormat::Mp4)
        } else if mime.contains("wav") {
            Some(AudioFormat::Wav)
        } else if mime.contains("flac") {
            Some(AudioFormat::Flac)
        } else if mime.contains("ogg") {
            Some(AudioFormat::Ogg)
        } else if mime.contains("webm") {
            Some(AudioFormat::Webm)
        } else {
            None
        }
    }

    /// 設定ファイルや CLI で使う短い名前から解釈する。
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "webm" => Some(AudioFormat::Webm),
            "mp4" | "m4a" => Some(AudioFormat::Mp4),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "ogg" => Some(AudioFormat::Ogg),
            other => AudioFormat::from_mime(other),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// 既定の優先順
pub const DEFAULT_PREFERENCES: &[AudioFormat] =
    &[AudioFormat::Webm, AudioFormat::Mp4, AudioFormat::Wav];

/// 優先リストとバックエンドの対応フォーマットから録音フォーマットを 1 つ決める。
/// 一致が無ければバックエンドの既定（先頭）を使う。
pub fn resolve_capture_format(
    preferences: &[AudioFormat],
    supported: &[AudioFormat],
) -> Option<AudioFormat> {
    preferences
        .iter()
        .copied()
        .find(|f| supported.contains(f))
        .or_else(|| supported.first().copied())
}

/// メディアタイプからアップロード用ファイル名を作る。不明なら webm 扱い。
pub fn upload_file_name(mime: &str) -> String {
    let format = AudioFormat::from_mime(mime).unwrap_or(AudioFormat::Webm);
    format!("{UPLOAD_STEM}.{}", format.extension())
}
