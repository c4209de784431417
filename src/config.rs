//! Configuration loading and defaults.
//!
//! Layered the usual way: built-in defaults, then the TOML config file,
//! then environment variables, then CLI flags (applied in `app.rs`).

use crate::defaults;
use crate::error::{RelayError, Result};
use crate::stream::pacer::PacingMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stream: StreamConfig,
    pub service: ServiceConfig,
    pub output: OutputConfig,
}

/// Audio source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate the decoder normalizes to and the service expects.
    pub sample_rate: u32,
}

/// Streaming / silence gating configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Frame size in bytes (must be a positive multiple of the sample width).
    pub frame_bytes: usize,
    /// Wall-clock duration of one frame in milliseconds (real-time pacing).
    pub frame_duration_ms: u64,
    /// Amplitude below which a sample counts as silent (0..=32767).
    pub silence_threshold: i16,
    /// Consecutive silent frames before a reset token is sent.
    pub silent_frame_limit: u32,
    /// Pacing mode: real-time playback or as fast as the socket accepts.
    pub mode: PacingMode,
    /// Delay between end-of-stream and close, for trailing results.
    pub close_grace_ms: u64,
}

/// Remote recognizer configuration.
///
/// The tuning knobs are opaque to this client; they are appended to the
/// endpoint as query parameters and passed through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// WebSocket endpoint without query parameters.
    pub endpoint: String,
    pub language: String,
    pub output_native: bool,
    pub not_use_prompt: bool,
    pub denoise: bool,
    pub normalize: bool,
    pub dynamic_language_detection: bool,
    pub no_speech_threshold: f32,
    pub scores_threshold: f32,
    pub vad_min_speech_threshold: f32,
    pub beam_size: u32,
    pub temperatures: f32,
}

/// Transcript output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// File that finalized transcript segments are appended to.
    pub path: PathBuf,
    /// Clear any previous transcript before streaming starts.
    pub truncate: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_bytes: defaults::FRAME_BYTES,
            frame_duration_ms: defaults::FRAME_DURATION_MS,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            silent_frame_limit: defaults::SILENT_FRAME_LIMIT,
            mode: PacingMode::RealTime,
            close_grace_ms: defaults::CLOSE_GRACE_MS,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ENDPOINT.to_string(),
            language: "en".to_string(),
            output_native: true,
            not_use_prompt: true,
            denoise: true,
            normalize: true,
            dynamic_language_detection: false,
            no_speech_threshold: 0.4,
            scores_threshold: 0.7,
            vad_min_speech_threshold: 0.3,
            beam_size: 3,
            temperatures: 0.2,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::OUTPUT_PATH),
            truncate: true,
        }
    }
}

impl ServiceConfig {
    /// Build the full connection URL with all tuning parameters.
    ///
    /// `output_format=json` is fixed: the session's message parser only
    /// understands the JSON result shape.
    pub fn url(&self) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}output_format=json&output_native={}&not_use_prompt={}&denoise={}&normalize={}\
             &dynamic_language_detection={}&lang={}&no_speech_threshold={}&scores_threshold={}\
             &vad_min_speech_threshold={}&beam_size={}&temperatures={}",
            self.endpoint,
            sep,
            self.output_native,
            self.not_use_prompt,
            self.denoise,
            self.normalize,
            self.dynamic_language_detection,
            self.language,
            self.no_speech_threshold,
            self.scores_threshold,
            self.vad_min_speech_threshold,
            self.beam_size,
            self.temperatures,
        )
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelayError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                RelayError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(RelayError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Default config file location: `~/.config/voxrelay/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxrelay")
            .join("config.toml")
    }

    /// Apply environment variable overrides.
    ///
    /// Supported:
    /// - VOXRELAY_ENDPOINT → service.endpoint
    /// - VOXRELAY_LANGUAGE → service.language
    /// - VOXRELAY_OUTPUT → output.path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("VOXRELAY_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.service.endpoint = endpoint;
        }
        if let Ok(language) = std::env::var("VOXRELAY_LANGUAGE")
            && !language.is_empty()
        {
            self.service.language = language;
        }
        if let Ok(output) = std::env::var("VOXRELAY_OUTPUT")
            && !output.is_empty()
        {
            self.output.path = PathBuf::from(output);
        }
        self
    }

    /// Validate configuration invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.stream.frame_bytes == 0 || self.stream.frame_bytes % 2 != 0 {
            return Err(RelayError::ConfigInvalidValue {
                key: "stream.frame_bytes".to_string(),
                message: "must be a positive multiple of 2 (16-bit samples)".to_string(),
            });
        }
        if self.stream.silent_frame_limit == 0 {
            return Err(RelayError::ConfigInvalidValue {
                key: "stream.silent_frame_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.stream.silence_threshold < 0 {
            return Err(RelayError::ConfigInvalidValue {
                key: "stream.silence_threshold".to_string(),
                message: "must be non-negative".to_string(),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(RelayError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Annotated TOML template for `voxrelay config dump`.
    pub fn dump_template() -> String {
        let defaults = Config::default();
        format!(
            r#"# voxrelay configuration
# Place at ~/.config/voxrelay/config.toml

[audio]
# Sample rate the decoder normalizes to (Hz)
sample_rate = {sample_rate}

[stream]
# Frame size in bytes ({frame_bytes} = 100ms of 16kHz mono s16)
frame_bytes = {frame_bytes}
# Wall-clock duration of one frame (real-time pacing)
frame_duration_ms = {frame_duration_ms}
# Samples below this amplitude count as silent (0..=32767)
silence_threshold = {silence_threshold}
# Consecutive silent frames before a reset token is sent
silent_frame_limit = {silent_frame_limit}
# "real-time" or "fast"
mode = "{mode}"
# Delay between end-of-stream and close (ms)
close_grace_ms = {close_grace_ms}

[service]
# WebSocket endpoint (query parameters are appended automatically)
endpoint = "{endpoint}"
language = "{language}"
denoise = {denoise}
normalize = {normalize}
beam_size = {beam_size}
temperatures = {temperatures}

[output]
# Finalized transcript segments are appended here
path = "{output_path}"
# Clear any previous transcript before streaming
truncate = {truncate}
"#,
            sample_rate = defaults.audio.sample_rate,
            frame_bytes = defaults.stream.frame_bytes,
            frame_duration_ms = defaults.stream.frame_duration_ms,
            silence_threshold = defaults.stream.silence_threshold,
            silent_frame_limit = defaults.stream.silent_frame_limit,
            mode = defaults.stream.mode,
            close_grace_ms = defaults.stream.close_grace_ms,
            endpoint = defaults.service.endpoint,
            language = defaults.service.language,
            denoise = defaults.service.denoise,
            normalize = defaults.service.normalize,
            beam_size = defaults.service.beam_size,
            temperatures = defaults.service.temperatures,
            output_path = defaults.output.path.display(),
            truncate = defaults.output.truncate,
        )
    }
}
