use super::{AudioEncodeError, PcmBuffer};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// 16bit PCM バッファを WAV (RIFF) としてメモリ上に書き出す
pub fn encode_wav_i16(pcm: &PcmBuffer) -> Result<Vec<u8>, AudioEncodeError> {
    let spec = WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm.samples.len() * 2));
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| AudioEncodeError::Wav(e.to_string()))?;
        for &s in &pcm.samples {
            writer
                .write_sample(s)
                .map_err(|e| AudioEncodeError::Wav(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioEncodeError::Wav(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}
