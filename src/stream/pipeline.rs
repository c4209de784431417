//! The silence-gated streaming loop.
//!
//! Drives one Chunker/Classifier/Gate/Session cycle per pacer tick.
//! Connection state is checked before every send; the loop stops at
//! end-of-stream or as soon as the state leaves Open.

use crate::config::StreamConfig;
use crate::output::Printer;
use crate::session::connection::{SendOutcome, Session};
use crate::session::state::ConnectionState;
use crate::stream::chunker::Chunker;
use crate::stream::pacer::Pacer;
use crate::stream::silence::{GateAction, SilenceGate, is_silent};
use std::time::Duration;

/// Why the streaming loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The whole buffer was streamed; clean completion.
    Completed,
    /// The connection closed before end-of-stream.
    ConnectionClosed,
    /// The connection errored before end-of-stream.
    ConnectionErrored,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Audio frames accepted by the outbound buffer.
    pub frames_sent: u64,
    /// Reset control tokens accepted by the outbound buffer.
    pub resets_sent: u64,
    /// Frames dropped to backpressure or a mid-tick state change.
    pub frames_skipped: u64,
}

/// One run's streaming state: cursor, gate, and pacer.
pub struct StreamPipeline {
    chunker: Chunker,
    gate: SilenceGate,
    pacer: Pacer,
    silence_threshold: i16,
    close_grace: Duration,
}

impl StreamPipeline {
    /// Builds a pipeline over a decoded sample buffer.
    pub fn new(samples: Vec<i16>, config: &StreamConfig) -> Self {
        let frame_samples = config.frame_bytes / 2;
        Self {
            chunker: Chunker::new(samples, frame_samples),
            gate: SilenceGate::new(config.silent_frame_limit),
            pacer: Pacer::new(config.mode, Duration::from_millis(config.frame_duration_ms)),
            silence_threshold: config.silence_threshold,
            close_grace: Duration::from_millis(config.close_grace_ms),
        }
    }

    /// Total frames this run will attempt to stream.
    pub fn total_frames(&self) -> usize {
        self.chunker.total_frames()
    }

    /// Total audio duration of the buffer in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        self.chunker.duration_ms(sample_rate)
    }

    /// Streams the buffer until end-of-stream or the connection leaves Open.
    ///
    /// On end-of-stream this waits out the close grace period so trailing
    /// results can arrive, but leaves closing the session to the caller.
    pub async fn run(mut self, session: &Session, printer: &Printer) -> (StreamOutcome, StreamStats) {
        let mut stats = StreamStats::default();

        loop {
            self.pacer.tick().await;

            if !session.is_open() {
                let outcome = match session.state() {
                    ConnectionState::Errored => StreamOutcome::ConnectionErrored,
                    _ => StreamOutcome::ConnectionClosed,
                };
                return (outcome, stats);
            }

            let index = self.chunker.frame_index();
            let Some(frame) = self.chunker.next_frame() else {
                printer.note("Finished streaming file");
                tokio::time::sleep(self.close_grace).await;
                return (StreamOutcome::Completed, stats);
            };

            let silent = is_silent(frame, self.silence_threshold);
            match self.gate.observe(silent) {
                GateAction::Send => match session.try_send_audio(frame) {
                    SendOutcome::Sent => stats.frames_sent += 1,
                    SendOutcome::Backpressure => {
                        stats.frames_skipped += 1;
                        printer.debug(&format!("Backpressure, skipping frame {}", index));
                    }
                    SendOutcome::NotOpen => stats.frames_skipped += 1,
                },
                GateAction::Reset => match session.try_send_control() {
                    SendOutcome::Sent => {
                        stats.resets_sent += 1;
                        printer.debug(&format!("Sustained silence at frame {}, reset sent", index));
                    }
                    SendOutcome::Backpressure | SendOutcome::NotOpen => {
                        stats.frames_skipped += 1;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::output::Printer;
    use crate::sink::CollectorSink;
    use crate::stream::pacer::PacingMode;

    fn fast_config() -> StreamConfig {
        StreamConfig {
            frame_bytes: 32,
            frame_duration_ms: 1,
            silence_threshold: 400,
            silent_frame_limit: 3,
            mode: PacingMode::Fast,
            close_grace_ms: 0,
        }
    }

    #[test]
    fn test_total_frames() {
        // 64 samples, 16 samples per frame
        let pipeline = StreamPipeline::new(vec![0i16; 64], &fast_config());
        assert_eq!(pipeline.total_frames(), 4);
    }

    #[test]
    fn test_gate_action_sequence_through_pipeline_components() {
        // The pipeline wires classifier output into the gate; verify the
        // composed decision for a voiced/silent frame mix.
        let config = fast_config();
        let frame_samples = config.frame_bytes / 2;

        let mut samples = Vec::new();
        // S, S, S, V, S, S, S
        for voiced in [false, false, false, true, false, false, false] {
            let value = if voiced { 5000i16 } else { 0 };
            samples.extend(std::iter::repeat_n(value, frame_samples));
        }

        let mut chunker = Chunker::new(samples, frame_samples);
        let mut gate = SilenceGate::new(config.silent_frame_limit);
        let mut actions = Vec::new();
        while let Some(frame) = chunker.next_frame() {
            actions.push(gate.observe(is_silent(frame, config.silence_threshold)));
        }

        assert_eq!(
            actions,
            vec![
                GateAction::Send,
                GateAction::Send,
                GateAction::Reset,
                GateAction::Send,
                GateAction::Send,
                GateAction::Send,
                GateAction::Reset,
            ]
        );
    }

    #[test]
    fn test_duration_reporting() {
        let pipeline = StreamPipeline::new(vec![0i16; 16000], &fast_config());
        assert_eq!(pipeline.duration_ms(16000), 1000);
    }

    #[tokio::test]
    async fn test_backpressure_skips_frames_without_stopping() {
        // Recognizer that accepts the handshake and never reads: the writer
        // stalls, the outbound buffer fills, and the loop must skip frames
        // rather than block or treat the condition as an error.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            std::future::pending::<()>().await;
        });

        let session = Session::connect_with_buffer(
            &format!("ws://127.0.0.1:{port}/"),
            Box::new(CollectorSink::new()),
            Printer::new(true, 0),
            1,
        )
        .await
        .unwrap();

        let mut config = fast_config();
        config.frame_bytes = 4 * 1024 * 1024;
        config.close_grace_ms = 0;
        let frame_samples = config.frame_bytes / 2;
        let samples = vec![1000i16; frame_samples * 6];
        let pipeline = StreamPipeline::new(samples, &config);

        let printer = Printer::new(true, 0);
        let (outcome, stats) = pipeline.run(&session, &printer).await;

        // End-of-stream was reached despite the stalled transport
        assert_eq!(outcome, StreamOutcome::Completed);
        assert!(stats.frames_skipped > 0);
        assert_eq!(stats.frames_sent + stats.frames_skipped, 6);
        assert_eq!(stats.resets_sent, 0);
        assert!(session.is_open());
    }

    #[test]
    fn test_all_voiced_never_resets() {
        let config = fast_config();
        let frame_samples = config.frame_bytes / 2;
        let mut chunker = Chunker::new(vec![3000i16; frame_samples * 10], frame_samples);
        let mut gate = SilenceGate::new(config.silent_frame_limit);

        let mut sends = 0;
        let mut resets = 0;
        while let Some(frame) = chunker.next_frame() {
            match gate.observe(is_silent(frame, config.silence_threshold)) {
                GateAction::Send => sends += 1,
                GateAction::Reset => resets += 1,
            }
        }
        assert_eq!(sends, 10);
        assert_eq!(resets, 0);
    }
}
