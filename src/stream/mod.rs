//! The silence-gated streaming pipeline.
//!
//! Flow: decoded buffer → [`chunker`] → [`silence`] classification and
//! gating → session sends, driven by the [`pacer`] inside [`pipeline`].

pub mod chunker;
pub mod pacer;
pub mod pipeline;
pub mod silence;

pub use chunker::Chunker;
pub use pacer::{Pacer, PacingMode};
pub use pipeline::{StreamOutcome, StreamPipeline, StreamStats};
pub use silence::{GateAction, SilenceGate, is_silent};
