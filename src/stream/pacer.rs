//! Pacing between frame sends.
//!
//! Real-time mode fires once per frame duration so a pre-recorded file is
//! delivered at microphone rate. Fast mode only yields to the scheduler
//! between sends and is meant for bulk offline transcription.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Pacing mode for the streaming loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PacingMode {
    /// One frame per wall-clock frame duration.
    #[default]
    RealTime,
    /// As fast as the transport accepts writes.
    Fast,
}

impl fmt::Display for PacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingMode::RealTime => write!(f, "real-time"),
            PacingMode::Fast => write!(f, "fast"),
        }
    }
}

/// Drives the streaming loop cadence.
pub struct Pacer {
    ticker: Option<Interval>,
}

impl Pacer {
    /// Creates a pacer for the given mode and frame duration.
    ///
    /// Missed ticks are delayed rather than burst so a slow send never
    /// causes a flurry of catch-up frames.
    pub fn new(mode: PacingMode, frame_duration: Duration) -> Self {
        let ticker = match mode {
            PacingMode::RealTime => {
                let mut t = interval(frame_duration);
                t.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(t)
            }
            PacingMode::Fast => None,
        };
        Self { ticker }
    }

    /// Waits until the next frame should be sent.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => tokio::task::yield_now().await,
        }
    }
}
