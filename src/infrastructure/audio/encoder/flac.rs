use super::{AudioEncodeError, PcmBuffer};
use flacenc::component::BitRepr;
use flacenc::error::Verify;

/// 16bit PCM バッファから FLAC ストリームを生成する
pub fn encode_flac_i16(pcm: &PcmBuffer) -> Result<Vec<u8>, AudioEncodeError> {
    // flacenc は i32 サンプルを想定するため変換
    let pcm_i32: Vec<i32> = pcm.samples.iter().map(|&s| i32::from(s)).collect();

    let cfg = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|e| AudioEncodeError::Flac(format!("config verify failed: {e:?}")))?;

    let source = flacenc::source::MemSource::from_samples(
        &pcm_i32,
        usize::from(pcm.channels),
        16,
        pcm.sample_rate as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&cfg, source, cfg.block_size)
        .map_err(|e| AudioEncodeError::Flac(format!("encode failed: {e}")))?;

    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| AudioEncodeError::Flac(format!("write failed: {e}")))?;

    Ok(sink.as_slice().to_vec())
}
