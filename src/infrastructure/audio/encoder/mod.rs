use thiserror::Error;

use super::AudioFormat;

pub mod flac;
pub mod wav;

#[derive(Debug, Error)]
pub enum AudioEncodeError {
    #[error("FLAC encode failed: {0}")]
    Flac(String),

    #[error("WAV encode failed: {0}")]
    Wav(String),

    #[error("no encoder for {0}")]
    Unsupported(AudioFormat),
}

/// 16bit PCM (interleaved) の録音バッファ
#[derive(Debug, Clone, Default)]
pub struct PcmBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// 指定フォーマットでエンコードする。サンプルが無ければ空のバイト列を返す。
pub fn encode(pcm: &PcmBuffer, format: AudioFormat) -> Result<Vec<u8>, AudioEncodeError> {
    if pcm.is_empty() {
        return Ok(Vec::new());
    }
    match format {
        AudioFormat::Wav => wav::encode_wav_i16(pcm),
        AudioFormat::Flac => flac::encode_flac_i16(pcm),
        other => Err(AudioEncodeError::Unsupported(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize) -> PcmBuffer {
        let mut pcm = PcmBuffer::new(16_000, 1);
        pcm.samples = (0..len)
            .map(|i| ((i as f32 * 0.05).sin() * 8_000.0) as i16)
            .collect();
        pcm
    }

    #[test]
    fn empty_buffer_encodes_to_nothing() {
        let pcm = PcmBuffer::new(16_000, 1);
        assert!(encode(&pcm, AudioFormat::Wav).unwrap().is_empty());
        assert!(encode(&pcm, AudioFormat::Flac).unwrap().is_empty());
    }

    #[test]
    fn wav_output_has_riff_header() {
        let bytes = encode(&tone(1_600), AudioFormat::Wav).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn flac_output_has_magic() {
        let bytes = encode(&tone(8_000), AudioFormat::Flac).unwrap();
        assert_eq!(&bytes[0..4], b"fLaC");
    }

    #[test]
    fn browser_containers_are_not_encodable() {
        assert!(matches!(
            encode(&tone(10), AudioFormat::Webm),
            Err(AudioEncodeError::Unsupported(AudioFormat::Webm))
        ));
    }
}
