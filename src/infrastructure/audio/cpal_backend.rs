use super::encoder::{self, PcmBuffer};
use super::{AudioBackend, AudioBackendError, AudioData, AudioFormat};
use cpal::{
    Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, warn};

/// cpal バックエンドが生成できるフォーマット（先頭が既定）
const SUPPORTED_FORMATS: &[AudioFormat] = &[AudioFormat::Wav, AudioFormat::Flac];

/// CPAL によるローカルマイク入力実装。
/// 録音中のサンプルはメモリに溜め、停止時に選択フォーマットへエンコードします。
pub struct CpalAudioBackend {
    /// ランタイム中の入力ストリーム
    stream: Mutex<Option<Stream>>,
    /// 録音フラグ
    recording: Arc<AtomicBool>,
    /// 録音中の PCM バッファ
    buffer: Arc<Mutex<PcmBuffer>>,
    /// 停止時のエンコード先
    format: Mutex<AudioFormat>,
    /// `INPUT_DEVICE_PRIORITY` 相当の優先デバイス名
    device_priority: Vec<String>,
}

impl Default for CpalAudioBackend {
    fn default() -> Self {
        Self::with_device_priority(Vec::new())
    }
}

impl CpalAudioBackend {
    /// 優先デバイス名のリストを指定して作成
    pub fn with_device_priority(device_priority: Vec<String>) -> Self {
        Self {
            stream: Mutex::new(None),
            recording: Arc::new(AtomicBool::new(false)),
            buffer: Arc::new(Mutex::new(PcmBuffer::default())),
            format: Mutex::new(SUPPORTED_FORMATS[0]),
            device_priority,
        }
    }
}

/// カンマ区切りの優先リストを解釈する
pub fn parse_device_priority(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 利用可能な入力デバイス名を列挙
pub fn list_input_devices() -> Result<Vec<String>, AudioBackendError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AudioBackendError::DeviceUnavailable(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// 優先順位の高い入力デバイスを選択し、無ければデフォルトを返します。
fn select_input_device(host: &cpal::Host, priorities: &[String]) -> Option<Device> {
    if !priorities.is_empty() {
        let available: Vec<Device> = host.input_devices().ok()?.collect();
        for want in priorities {
            if let Some(dev) = available
                .iter()
                .find(|d| d.name().map(|n| n == *want).unwrap_or(false))
            {
                info!(device = %want, "using preferred input device");
                return Some(dev.clone());
            }
        }
        warn!("no preferred device found, falling back to default input device");
    }
    host.default_input_device()
}

// =============== 内部ユーティリティ ================================
impl CpalAudioBackend {
    /// CPAL ストリームを構築。サンプルを 16bit に変換してバッファへ追加します。
    fn build_input_stream(
        &self,
        device: &Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
    ) -> Result<Stream, AudioBackendError> {
        match sample_format {
            SampleFormat::I16 => self.build_stream_for::<i16>(device, config),
            SampleFormat::U16 => self.build_stream_for::<u16>(device, config),
            SampleFormat::F32 => self.build_stream_for::<f32>(device, config),
            other => Err(AudioBackendError::UnsupportedSampleFormat(format!(
                "{other:?}"
            ))),
        }
    }

    fn build_stream_for<T>(
        &self,
        device: &Device,
        config: &StreamConfig,
    ) -> Result<Stream, AudioBackendError>
    where
        T: SizedSample + Send + 'static,
        i16: FromSample<T>,
    {
        let recording = self.recording.clone();
        let buffer = self.buffer.clone();
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if !recording.load(Ordering::SeqCst) {
                        return;
                    }
                    if let Ok(mut pcm) = buffer.lock() {
                        pcm.samples
                            .extend(data.iter().map(|&s| i16::from_sample(s)));
                    }
                },
                |e| warn!(error = %e, "input stream error"),
                None,
            )
            .map_err(|e| AudioBackendError::StreamBuild(e.to_string()))
    }

    /// ストリームを破棄してデバイスを解放する
    fn release_stream(&self) {
        self.recording.store(false, Ordering::SeqCst);
        if let Ok(mut stream) = self.stream.lock() {
            if let Some(s) = stream.take() {
                let _ = s.pause();
                drop(s);
                debug!("input stream released");
            }
        }
    }

    fn take_buffer(&self) -> PcmBuffer {
        self.buffer
            .lock()
            .map(|mut pcm| std::mem::take(&mut *pcm))
            .unwrap_or_default()
    }
}

impl AudioBackend for CpalAudioBackend {
    fn supported_formats(&self) -> &[AudioFormat] {
        SUPPORTED_FORMATS
    }

    /// 録音ストリームを開始します。
    fn start_recording(&self, format: AudioFormat) -> Result<(), AudioBackendError> {
        if self.is_recording() {
            return Err(AudioBackendError::AlreadyRecording);
        }
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(AudioBackendError::UnsupportedFormat(format));
        }

        // ホスト・デバイス取得
        let host = cpal::default_host();
        let device = select_input_device(&host, &self.device_priority).ok_or_else(|| {
            AudioBackendError::DeviceUnavailable(
                "no input device available (check INPUT_DEVICE_PRIORITY)".to_string(),
            )
        })?;

        let supported = device
            .default_input_config()
            .map_err(|e| AudioBackendError::DeviceUnavailable(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        if let Ok(mut pcm) = self.buffer.lock() {
            *pcm = PcmBuffer::new(config.sample_rate.0, config.channels);
        }
        if let Ok(mut f) = self.format.lock() {
            *f = format;
        }

        let stream = self.build_input_stream(&device, &config, sample_format)?;
        self.recording.store(true, Ordering::SeqCst);
        if let Err(e) = stream.play() {
            self.recording.store(false, Ordering::SeqCst);
            return Err(AudioBackendError::StreamBuild(e.to_string()));
        }

        if let Ok(mut slot) = self.stream.lock() {
            *slot = Some(stream);
        }
        info!(
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            %format,
            "recording started"
        );
        Ok(())
    }

    /// 録音を停止し、エンコード済みデータを返します。
    fn stop_recording(&self) -> Result<AudioData, AudioBackendError> {
        if !self.is_recording() {
            return Err(AudioBackendError::NotRecording);
        }
        self.release_stream();

        let pcm = self.take_buffer();
        let format = self
            .format
            .lock()
            .map(|f| *f)
            .unwrap_or(SUPPORTED_FORMATS[0]);
        debug!(samples = pcm.samples.len(), %format, "encoding capture");

        let bytes = encoder::encode(&pcm, format)?;
        Ok(AudioData::new(bytes, format.mime_type()))
    }

    /// 録音中かどうかを確認します。
    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

impl Drop for CpalAudioBackend {
    fn drop(&mut self) {
        self.release_stream();
    }
}
