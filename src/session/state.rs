//! Connection state for a recognizer session.

use std::fmt;

/// Lifecycle of the duplex connection.
///
/// Only the session's reader and writer tasks mutate the state; everything
/// else (the pacing loop in particular) observes it through a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been attempted.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Ready to stream.
    Open,
    /// Graceful close requested, trailing results may still arrive.
    Closing,
    /// Connection ended cleanly.
    Closed,
    /// Transport failure; streaming must stop.
    Errored,
}

impl ConnectionState {
    /// True while frames may be sent.
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    /// True once the connection can never become open again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "errored",
        };
        write!(f, "{}", name)
    }
}
