//! Terminal rendering for stream progress and recognition results.
//!
//! All status output goes to stderr so transcripts piped to stdout stay
//! clean. Quiet mode suppresses status lines; warnings always show.

use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces a pending partial result).
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Verbosity-gated stderr printer shared by the pipeline and the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    pub quiet: bool,
    /// 0 = status lines, 1 = partial results, 2 = per-frame diagnostics.
    pub verbosity: u8,
}

impl Printer {
    pub fn new(quiet: bool, verbosity: u8) -> Self {
        Self { quiet, verbosity }
    }

    /// Status line, suppressed in quiet mode.
    pub fn note(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg);
        }
    }

    /// Diagnostic line, shown at -vv.
    pub fn debug(&self, msg: &str) {
        if !self.quiet && self.verbosity >= 2 {
            eprintln!("{DIM}{msg}{RESET}");
        }
    }

    /// Warning line, always shown.
    pub fn warn(&self, msg: &str) {
        eprintln!("{YELLOW}{msg}{RESET}");
    }

    /// Partial recognition result, overwritten in place. Shown at -v.
    pub fn partial(&self, text: &str) {
        if !self.quiet && self.verbosity >= 1 {
            eprint!("\r\x1b[2K{DIM}{text}{RESET}");
            let _ = io::stderr().flush();
        }
    }

    /// Finalized segment, replacing any pending partial line.
    pub fn final_segment(&self, text: &str) {
        if !self.quiet {
            clear_line();
            eprintln!("{GREEN}{text}{RESET}");
        }
    }

    /// End-of-run summary.
    pub fn summary(&self, frames_sent: u64, resets_sent: u64, frames_skipped: u64, finals: u64) {
        if self.quiet {
            return;
        }
        clear_line();
        if frames_skipped > 0 {
            eprintln!(
                "Done: {} frames sent, {} resets, {} frames skipped, {} segments written",
                frames_sent, resets_sent, frames_skipped, finals
            );
        } else {
            eprintln!(
                "Done: {} frames sent, {} resets, {} segments written",
                frames_sent, resets_sent, finals
            );
        }
    }
}
