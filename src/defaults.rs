//! Default configuration constants for voxrelay.
//!
//! Shared constants used across configuration types to keep the CLI,
//! config file, and pipeline defaults in one place.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and what the remote
/// recognizer expects on its binary input.
pub const SAMPLE_RATE: u32 = 16000;

/// Default frame size in bytes.
///
/// 3200 bytes = 1600 samples = 100ms of 16-bit mono audio at 16kHz.
/// Frames smaller than one frame at the end of the buffer are dropped.
pub const FRAME_BYTES: usize = 3200;

/// Default frame duration in milliseconds, used for real-time pacing.
///
/// Must correspond to `FRAME_BYTES` at the configured sample rate so that
/// real-time mode approximates microphone-rate playback.
pub const FRAME_DURATION_MS: u64 = 100;

/// Default silence amplitude threshold.
///
/// A frame is silent when every sample's absolute value is strictly below
/// this (16-bit amplitude units, 0..=32767). 400 rejects typical room noise
/// without swallowing quiet speech.
pub const SILENCE_THRESHOLD: i16 = 400;

/// Default number of consecutive silent frames before a reset is sent.
///
/// 15 frames at 100ms per frame is ~1.5 seconds of sustained silence.
pub const SILENT_FRAME_LIMIT: u32 = 15;

/// Grace period in milliseconds between end-of-stream and closing the
/// session, so trailing recognition results can still arrive.
pub const CLOSE_GRACE_MS: u64 = 2000;

/// Reserved control token that asks the recognizer to flush its utterance
/// buffer. Sent as a text message in place of an audio frame.
pub const RESET_TOKEN: &str = "reset";

/// Default recognizer endpoint (scheme, host, port, and path — query
/// parameters are appended from the service configuration).
pub const ENDPOINT: &str = "ws://127.0.0.1:80/api-speech-wss/";

/// Default transcript output path.
pub const OUTPUT_PATH: &str = "transcript.txt";

/// Outbound channel capacity between the pacing loop and the socket writer.
///
/// When the writer cannot drain this many frames, the pacer treats the
/// condition as backpressure and skips the tick instead of blocking.
pub const OUTBOUND_BUFFER: usize = 32;
