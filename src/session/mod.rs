//! Recognizer session: connection, state machine, and wire protocol.

pub mod connection;
pub mod protocol;
pub mod state;

pub use connection::{SendOutcome, Session};
pub use state::ConnectionState;
