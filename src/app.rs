//! Streaming run entry point.
//!
//! Orchestrates the complete flow for one run:
//! decode → connect → silence-gated stream → close → report.

use crate::audio::decoder;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::output::Printer;
use crate::session::Session;
use crate::sink::{FileSink, StdoutSink, TranscriptSink};
use crate::stream::pacer::PacingMode;
use crate::stream::pipeline::{StreamOutcome, StreamPipeline};
use std::path::Path;

/// Runs one streaming run: decode the file, stream it through the silence
/// gate, and append finalized transcript segments to the output.
pub async fn run_stream_command(mut config: Config, cli: &Cli) -> Result<()> {
    apply_cli_overrides(&mut config, cli);
    config.validate()?;

    let printer = Printer::new(cli.quiet, cli.verbose);
    let file = cli
        .file
        .as_deref()
        .ok_or_else(|| RelayError::Other("no audio file given".to_string()))?;

    // Decode first: a decode failure must abort before the session connects.
    let samples = decode_input(file, config.audio.sample_rate)?;

    let sink = open_sink(&config)?;
    let url = config.service.url();
    printer.note(&format!("Connecting to {}", config.service.endpoint));
    let session = Session::connect(&url, sink, printer).await?;

    let pipeline = StreamPipeline::new(samples, &config.stream);
    printer.note(&format!(
        "Streaming {} frames, {:.1}s of audio ({} mode)",
        pipeline.total_frames(),
        pipeline.duration_ms(config.audio.sample_rate) as f64 / 1000.0,
        config.stream.mode
    ));

    let (outcome, stats) = pipeline.run(&session, &printer).await;
    // Counted after close so segments arriving during the handshake show up
    let finals = session.close().await;

    printer.summary(
        stats.frames_sent,
        stats.resets_sent,
        stats.frames_skipped,
        finals,
    );

    match outcome {
        StreamOutcome::Completed => Ok(()),
        StreamOutcome::ConnectionClosed => Err(RelayError::ConnectionLost {
            message: "connection closed before end of stream".to_string(),
        }),
        StreamOutcome::ConnectionErrored => Err(RelayError::ConnectionLost {
            message: "connection errored before end of stream".to_string(),
        }),
    }
}

/// CLI flags win over config file and environment values.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.service.endpoint = endpoint.clone();
    }
    if let Some(language) = &cli.language {
        config.service.language = language.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if cli.fast {
        config.stream.mode = PacingMode::Fast;
    }
    if let Some(frame_bytes) = cli.frame_bytes {
        config.stream.frame_bytes = frame_bytes;
    }
    if let Some(threshold) = cli.silence_threshold {
        config.stream.silence_threshold = threshold;
    }
    if let Some(limit) = cli.silence_limit {
        config.stream.silent_frame_limit = limit;
    }
}

/// Decode the input file, stdin for `-`.
fn decode_input(file: &Path, sample_rate: u32) -> Result<Vec<i16>> {
    if file == Path::new("-") {
        decoder::decode_stdin(sample_rate)
    } else {
        decoder::decode_file(file, sample_rate)
    }
}

/// Open the transcript sink, stdout for `-`.
fn open_sink(config: &Config) -> Result<Box<dyn TranscriptSink>> {
    if config.output.path == Path::new("-") {
        Ok(Box::new(StdoutSink))
    } else {
        Ok(Box::new(FileSink::open(
            &config.output.path,
            config.output.truncate,
        )?))
    }
}
