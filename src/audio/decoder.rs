//! Audio decoding into the PCM shape the recognizer expects.
//!
//! WAV input is parsed with hound, downmixed to mono, and resampled to the
//! target rate. Raw `.pcm`/`.raw` input is assumed to already be conformant
//! 16-bit little-endian mono at the target rate. Decode failures are fatal:
//! the run aborts before a session is ever opened.

use crate::error::{RelayError, Result};
use std::io::Read;
use std::path::Path;

/// Decodes an audio file into mono 16-bit samples at `target_rate`.
///
/// Dispatches on the file extension: `.pcm` and `.raw` are read as raw
/// little-endian PCM, anything else is parsed as WAV.
pub fn decode_file(path: &Path, target_rate: u32) -> Result<Vec<i16>> {
    let is_raw = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("pcm") | Some("raw")
    );

    let bytes = std::fs::read(path).map_err(|e| RelayError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if is_raw {
        decode_raw_pcm(&bytes, path)
    } else {
        decode_wav(std::io::Cursor::new(bytes), target_rate).map_err(|e| match e {
            RelayError::Decode { message, .. } => RelayError::Decode {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }
}

/// Decodes WAV data from stdin (pipe mode, file argument `-`).
pub fn decode_stdin(target_rate: u32) -> Result<Vec<i16>> {
    let mut buffer = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut buffer)
        .map_err(|e| RelayError::Decode {
            path: "<stdin>".to_string(),
            message: e.to_string(),
        })?;
    decode_wav(std::io::Cursor::new(buffer), target_rate)
}

/// Parses WAV data from any reader, yielding mono samples at `target_rate`.
pub fn decode_wav(reader: impl Read, target_rate: u32) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| RelayError::Decode {
        path: "<reader>".to_string(),
        message: format!("failed to parse WAV header: {}", e),
    })?;

    let spec = wav_reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(RelayError::UnsupportedFormat {
            message: format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }
    if spec.channels == 0 || spec.channels > 2 {
        return Err(RelayError::UnsupportedFormat {
            message: format!("expected mono or stereo, got {} channels", spec.channels),
        });
    }

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| RelayError::Decode {
            path: "<reader>".to_string(),
            message: format!("failed to read WAV samples: {}", e),
        })?;

    // Downmix stereo by averaging channels
    let mono_samples = if spec.channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    if spec.sample_rate != target_rate {
        Ok(resample(&mono_samples, spec.sample_rate, target_rate))
    } else {
        Ok(mono_samples)
    }
}

/// Interprets raw bytes as little-endian 16-bit mono PCM.
fn decode_raw_pcm(bytes: &[u8], path: &Path) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(RelayError::Decode {
            path: path.display().to_string(),
            message: "raw PCM length is not a multiple of the sample width".to_string(),
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_16khz_passthrough() {
        let samples = vec![100i16, -200, 300, -400];
        let data = make_wav_data(16000, 1, &samples);
        let decoded = decode_wav(Cursor::new(data), 16000).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_stereo_downmixes_by_averaging() {
        // Interleaved L/R pairs
        let data = make_wav_data(16000, 2, &[100, 300, -100, -300]);
        let decoded = decode_wav(Cursor::new(data), 16000).unwrap();
        assert_eq!(decoded, vec![200, -200]);
    }

    #[test]
    fn test_decode_resamples_to_target_rate() {
        let samples = vec![0i16; 32000]; // 1 second at 32kHz
        let data = make_wav_data(32000, 1, &samples);
        let decoded = decode_wav(Cursor::new(data), 16000).unwrap();
        // Roughly 1 second at 16kHz
        assert!((decoded.len() as i64 - 16000).abs() <= 1);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result = decode_wav(Cursor::new(b"not a wav file".to_vec()), 16000);
        assert!(matches!(result, Err(RelayError::Decode { .. })));
    }

    #[test]
    fn test_decode_rejects_unsupported_bit_depth() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        writer.write_sample(0.5f32).unwrap();
        writer.finalize().unwrap();

        let result = decode_wav(Cursor::new(cursor.into_inner()), 16000);
        assert!(matches!(result, Err(RelayError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_decode_raw_pcm_little_endian() {
        let bytes = vec![0x01, 0x00, 0xFE, 0xFF];
        let decoded = decode_raw_pcm(&bytes, Path::new("test.pcm")).unwrap();
        assert_eq!(decoded, vec![1i16, -2]);
    }

    #[test]
    fn test_decode_raw_pcm_odd_length_is_error() {
        let result = decode_raw_pcm(&[0x01, 0x00, 0xFE], Path::new("test.pcm"));
        assert!(matches!(result, Err(RelayError::Decode { .. })));
    }

    #[test]
    fn test_decode_file_missing_is_decode_error() {
        let result = decode_file(Path::new("/nonexistent/audio.wav"), 16000);
        assert!(matches!(result, Err(RelayError::Decode { .. })));
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_downsample_halves_length() {
        let samples: Vec<i16> = (0..1000).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 500);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 44100, 16000).is_empty());
    }
}
