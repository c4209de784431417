//! Silence classification and the hysteresis gate.
//!
//! Classification is a stateless per-frame amplitude test. The gate adds
//! hysteresis on top: a run-length counter of consecutive silent frames
//! that fires a one-shot reset once the configured limit is reached, then
//! re-arms. Bounded runs of silence are still forwarded as audio so the
//! recognizer's own voice-activity logic sees natural pause cadence; only
//! the reset signal is gated.

/// Returns true when every sample's absolute value is strictly below
/// `threshold`. A single sample at or above the threshold makes the whole
/// frame voiced. An empty frame is silent by convention.
pub fn is_silent(frame: &[i16], threshold: i16) -> bool {
    frame
        .iter()
        .all(|&s| (s as i32).abs() < threshold as i32)
}

/// Action the gate decided for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Forward the frame as a binary audio payload.
    Send,
    /// Withhold the frame and send the reset control token instead.
    Reset,
}

/// Run-length counter over consecutive silent frames.
///
/// Invariant: the counter is always in `[0, limit)` between calls. It is
/// cleared by any voiced frame and by its own trigger, so a silent frame
/// immediately after a reset starts a fresh run toward the limit.
#[derive(Debug)]
pub struct SilenceGate {
    limit: u32,
    consecutive_silent: u32,
}

impl SilenceGate {
    /// Creates a gate that fires after `limit` consecutive silent frames.
    pub fn new(limit: u32) -> Self {
        debug_assert!(limit > 0);
        Self {
            limit,
            consecutive_silent: 0,
        }
    }

    /// Feeds one classified frame and returns the action to take.
    ///
    /// The frame that brings the counter up to the limit triggers the
    /// reset and is itself withheld; the control token substitutes for it.
    pub fn observe(&mut self, silent: bool) -> GateAction {
        if !silent {
            self.consecutive_silent = 0;
            return GateAction::Send;
        }

        self.consecutive_silent += 1;
        if self.consecutive_silent >= self.limit {
            self.consecutive_silent = 0;
            GateAction::Reset
        } else {
            GateAction::Send
        }
    }

    /// Current run length (for diagnostics).
    pub fn consecutive_silent(&self) -> u32 {
        self.consecutive_silent
    }
}
