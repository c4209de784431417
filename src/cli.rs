//! Command-line interface for voxrelay
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stream audio files to a remote speech recognizer
#[derive(Parser, Debug)]
#[command(
    name = "voxrelay",
    version = crate::version_string(),
    about = "Stream audio files to a remote speech recognizer"
)]
pub struct Cli {
    /// Audio file to stream (WAV, .pcm/.raw, or '-' for WAV on stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: partial results, -vv: per-frame diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recognizer WebSocket endpoint (query parameters appended automatically)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Language code for recognition (e.g., en, de, es)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Transcript output path ('-' for stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Stream as fast as the connection accepts instead of real time
    #[arg(long)]
    pub fast: bool,

    /// Frame size in bytes (default: 3200 = 100ms of 16kHz mono s16)
    #[arg(long, value_name = "BYTES")]
    pub frame_bytes: Option<usize>,

    /// Amplitude below which a sample counts as silent (0-32767)
    #[arg(long, value_name = "AMPLITUDE")]
    pub silence_threshold: Option<i16>,

    /// Consecutive silent frames before a reset is sent
    #[arg(long, value_name = "FRAMES")]
    pub silence_limit: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or dump configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print an annotated configuration template
    Dump,
}
