//! Recognizer session over a duplex WebSocket.
//!
//! One session owns the connection for one streaming run. The send path
//! and the receive path run as independent tasks: the pacing loop hands
//! outbound frames to a bounded channel drained by the writer task, and
//! the reader task parses inbound messages and appends finalized segments
//! to the sink. Connection state is mutated only by these two tasks and
//! observed by everyone else through a watch channel.

use crate::defaults;
use crate::error::{RelayError, Result};
use crate::output::Printer;
use crate::session::protocol;
use crate::session::state::ConnectionState;
use crate::sink::TranscriptSink;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `close` waits for the socket tasks to wind down.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a single non-blocking send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted by the outbound buffer.
    Sent,
    /// Outbound buffer full; the caller skips this tick (no retry queue).
    Backpressure,
    /// Connection is not open; the attempt is a no-op, not an error.
    NotOpen,
}

/// Outbound items handed from the pacing loop to the writer task.
enum Outbound {
    Audio(Vec<u8>),
    Control(String),
    Close,
}

/// A live connection to the recognizer.
pub struct Session {
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    outbound_tx: mpsc::Sender<Outbound>,
    finals_written: Arc<AtomicU64>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl Session {
    /// Connects to the recognizer endpoint and starts the socket tasks.
    ///
    /// The sink receives every finalized segment the service sends back,
    /// in receipt order, for the lifetime of the session.
    pub async fn connect(
        url: &str,
        sink: Box<dyn TranscriptSink>,
        printer: Printer,
    ) -> Result<Self> {
        Self::connect_with_buffer(url, sink, printer, defaults::OUTBOUND_BUFFER).await
    }

    /// `connect` with an explicit outbound buffer capacity. Tests use a
    /// capacity of 1 to force the backpressure path deterministically.
    pub(crate) async fn connect_with_buffer(
        url: &str,
        sink: Box<dyn TranscriptSink>,
        printer: Printer,
        capacity: usize,
    ) -> Result<Self> {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let state_tx = Arc::new(state_tx);

        let (ws, _response) = connect_async(url).await.map_err(|e| {
            state_tx.send_replace(ConnectionState::Errored);
            RelayError::Connect {
                endpoint: url.to_string(),
                message: e.to_string(),
            }
        })?;
        state_tx.send_replace(ConnectionState::Open);

        let (ws_sink, ws_stream) = ws.split();
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let finals_written = Arc::new(AtomicU64::new(0));

        let writer = tokio::spawn(writer_loop(
            ws_sink,
            outbound_rx,
            Arc::clone(&state_tx),
            printer,
        ));
        let reader = tokio::spawn(reader_loop(
            ws_stream,
            sink,
            Arc::clone(&state_tx),
            printer,
            Arc::clone(&finals_written),
        ));

        Ok(Self {
            state_tx,
            state_rx,
            outbound_tx,
            finals_written,
            writer,
            reader,
        })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// True while frames may be sent.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Number of finalized segments appended to the sink so far.
    pub fn finals_written(&self) -> u64 {
        self.finals_written.load(Ordering::Relaxed)
    }

    /// Attempts to send one audio frame without blocking.
    pub fn try_send_audio(&self, frame: &[i16]) -> SendOutcome {
        if !self.is_open() {
            return SendOutcome::NotOpen;
        }
        self.try_send(Outbound::Audio(frame_to_bytes(frame)))
    }

    /// Attempts to send the reset control token without blocking.
    pub fn try_send_control(&self) -> SendOutcome {
        if !self.is_open() {
            return SendOutcome::NotOpen;
        }
        self.try_send(Outbound::Control(defaults::RESET_TOKEN.to_string()))
    }

    fn try_send(&self, out: Outbound) -> SendOutcome {
        match self.outbound_tx.try_send(out) {
            Ok(()) => SendOutcome::Sent,
            Err(TrySendError::Full(_)) => SendOutcome::Backpressure,
            Err(TrySendError::Closed(_)) => SendOutcome::NotOpen,
        }
    }

    /// Closes the session gracefully and waits for the socket tasks.
    ///
    /// Returns the total number of finalized segments written, including
    /// any that arrive while the close handshake is in flight.
    pub async fn close(self) -> u64 {
        let Session {
            state_tx,
            state_rx,
            outbound_tx,
            finals_written,
            mut writer,
            mut reader,
        } = self;

        if state_rx.borrow().is_open() {
            state_tx.send_replace(ConnectionState::Closing);
        }

        // Ask the writer to send a close frame, then let both tasks drain.
        // A writer stalled on a full buffer must not wedge the close.
        let _ = timeout(CLOSE_TIMEOUT, outbound_tx.send(Outbound::Close)).await;
        drop(outbound_tx);

        if timeout(CLOSE_TIMEOUT, &mut writer).await.is_err() {
            writer.abort();
        }
        if timeout(CLOSE_TIMEOUT, &mut reader).await.is_err() {
            reader.abort();
        }

        if !state_rx.borrow().is_terminal() {
            state_tx.send_replace(ConnectionState::Closed);
        }

        finals_written.load(Ordering::Relaxed)
    }
}

/// Encode one frame of samples as little-endian PCM bytes.
fn frame_to_bytes(frame: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frame.len() * 2);
    for sample in frame {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Drains the outbound channel into the socket.
async fn writer_loop(
    mut ws_sink: SplitSink<WsStream, Message>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    state: Arc<watch::Sender<ConnectionState>>,
    printer: Printer,
) {
    while let Some(out) = outbound_rx.recv().await {
        let msg = match out {
            Outbound::Audio(bytes) => Message::Binary(bytes),
            Outbound::Control(token) => Message::Text(token),
            Outbound::Close => {
                if let Err(e) = ws_sink.send(Message::Close(None)).await {
                    printer.debug(&format!("Close frame not delivered: {}", e));
                }
                break;
            }
        };
        if let Err(e) = ws_sink.send(msg).await {
            printer.warn(&format!("Connection lost while sending: {}", e));
            state.send_replace(ConnectionState::Errored);
            break;
        }
    }
}

/// Parses inbound messages and forwards finalized segments to the sink.
async fn reader_loop(
    mut ws_stream: SplitStream<WsStream>,
    mut sink: Box<dyn TranscriptSink>,
    state: Arc<watch::Sender<ConnectionState>>,
    printer: Printer,
    finals_written: Arc<AtomicU64>,
) {
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(raw)) => {
                handle_text(&raw, sink.as_mut(), printer, &finals_written);
            }
            Ok(Message::Close(_)) => {
                if !state.borrow().is_terminal() {
                    state.send_replace(ConnectionState::Closed);
                }
                break;
            }
            // Pings are answered by the transport; other frames carry nothing.
            Ok(_) => {}
            Err(e) => {
                // A transport error during a requested close is still a close.
                if *state.borrow() == ConnectionState::Closing {
                    state.send_replace(ConnectionState::Closed);
                } else if !state.borrow().is_terminal() {
                    printer.warn(&format!("Connection error: {}", e));
                    state.send_replace(ConnectionState::Errored);
                }
                break;
            }
        }
    }
    if !state.borrow().is_terminal() {
        state.send_replace(ConnectionState::Closed);
    }
}

/// Handles one inbound text message. Malformed payloads are logged and
/// discarded; sink failures are logged and the stream continues.
fn handle_text(
    raw: &str,
    sink: &mut dyn TranscriptSink,
    printer: Printer,
    finals_written: &AtomicU64,
) {
    let message = match protocol::parse_message(raw) {
        Ok(message) => message,
        Err(e) => {
            printer.warn(&format!("Ignoring malformed message: {}", e));
            return;
        }
    };

    for entry in message.entries() {
        let text = entry.text.trim();
        if entry.is_final {
            if text.is_empty() {
                continue;
            }
            match sink.append(text) {
                Ok(()) => {
                    finals_written.fetch_add(1, Ordering::Relaxed);
                    printer.final_segment(text);
                }
                Err(e) => printer.warn(&format!("Dropped segment: {}", e)),
            }
        } else if !text.is_empty() {
            printer.partial(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectorSink;

    #[test]
    fn test_frame_to_bytes_little_endian() {
        let bytes = frame_to_bytes(&[1i16, -2, 0x1234]);
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF, 0x34, 0x12]);
    }

    #[test]
    fn test_frame_to_bytes_length() {
        let bytes = frame_to_bytes(&[0i16; 1600]);
        assert_eq!(bytes.len(), 3200);
    }

    #[test]
    fn test_handle_text_appends_trimmed_finals() {
        let collector = CollectorSink::new();
        let mut sink = collector.clone();
        let finals = AtomicU64::new(0);

        handle_text(
            r#"{"result":[{"is_final":true,"text":"  hello  "}]}"#,
            &mut sink,
            Printer::new(true, 0),
            &finals,
        );

        assert_eq!(collector.collected(), vec!["hello"]);
        assert_eq!(finals.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_handle_text_ignores_partials_and_malformed() {
        let collector = CollectorSink::new();
        let mut sink = collector.clone();
        let finals = AtomicU64::new(0);
        let printer = Printer::new(true, 0);

        handle_text(
            r#"{"result":[{"is_final":false,"text":"partial"}]}"#,
            &mut sink,
            printer,
            &finals,
        );
        handle_text("definitely not json", &mut sink, printer, &finals);
        handle_text(
            r#"{"result":[{"is_final":true,"text":"kept"}]}"#,
            &mut sink,
            printer,
            &finals,
        );

        assert_eq!(collector.collected(), vec!["kept"]);
        assert_eq!(finals.load(Ordering::Relaxed), 1);
    }

    /// Accepts the handshake and then never reads from the socket.
    async fn spawn_stalled_recognizer() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            std::future::pending::<()>().await;
        });
        port
    }

    #[tokio::test]
    async fn test_full_outbound_buffer_reports_backpressure() {
        let port = spawn_stalled_recognizer().await;
        let session = Session::connect_with_buffer(
            &format!("ws://127.0.0.1:{port}/"),
            Box::new(CollectorSink::new()),
            Printer::new(true, 0),
            1,
        )
        .await
        .unwrap();

        // Frames large enough that the writer stalls on the unread socket;
        // once the single buffer slot fills, sends must report backpressure
        // without blocking and without tearing the connection down.
        let frame = vec![1000i16; 2 * 1024 * 1024];
        let mut saw_backpressure = false;
        for _ in 0..64 {
            match session.try_send_audio(&frame) {
                SendOutcome::Backpressure => {
                    saw_backpressure = true;
                    break;
                }
                SendOutcome::Sent => tokio::task::yield_now().await,
                SendOutcome::NotOpen => panic!("connection dropped unexpectedly"),
            }
        }
        assert!(saw_backpressure);
        assert!(session.is_open());
        // Control tokens share the buffer and are deferred the same way
        assert_eq!(session.try_send_control(), SendOutcome::Backpressure);
    }

    #[test]
    fn test_handle_text_blank_final_is_discarded() {
        let collector = CollectorSink::new();
        let mut sink = collector.clone();
        let finals = AtomicU64::new(0);

        handle_text(
            r#"{"result":[{"is_final":true,"text":"   "}]}"#,
            &mut sink,
            Printer::new(true, 0),
            &finals,
        );

        assert!(collector.collected().is_empty());
        assert_eq!(finals.load(Ordering::Relaxed), 0);
    }
}
