//! Transcoder Adapter - 音频编解码

mod wav_transcoder;

pub use wav_transcoder::WavTranscoder;
