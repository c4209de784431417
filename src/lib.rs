//! voxrelay - stream audio files to a remote speech recognizer
//!
//! Paces raw PCM frames over a persistent WebSocket connection, forwards
//! bounded silence, signals sustained pauses with a reset token, and
//! persists finalized transcript segments as they arrive.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod session;
pub mod sink;
pub mod stream;

// Core pipeline (frames → gate → session)
pub use stream::chunker::Chunker;
pub use stream::pacer::{Pacer, PacingMode};
pub use stream::pipeline::{StreamOutcome, StreamPipeline, StreamStats};
pub use stream::silence::{GateAction, SilenceGate, is_silent};

// Session
pub use session::connection::{SendOutcome, Session};
pub use session::state::ConnectionState;

// Sinks (source → stream → sink)
pub use sink::{CollectorSink, FileSink, StdoutSink, TranscriptSink};

// Error handling
pub use error::{RelayError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
