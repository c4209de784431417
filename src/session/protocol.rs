//! Wire message types for the recognizer protocol.
//!
//! Inbound messages are self-contained JSON payloads carrying zero or more
//! result entries. Each entry has a finality flag and text; only finalized
//! entries with non-empty trimmed text are durable. Parse failures are the
//! caller's to log and discard — they are never fatal to the session.

use serde::Deserialize;

/// One recognition result entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResultEntry {
    /// True once the service will no longer revise this segment.
    #[serde(default)]
    pub is_final: bool,
    /// Transcribed text, possibly with surrounding whitespace.
    #[serde(default)]
    pub text: String,
}

/// An inbound message from the recognizer.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerMessage {
    /// Result entries; absent or null means no entries.
    #[serde(default)]
    pub result: Option<Vec<ResultEntry>>,
}

impl ServerMessage {
    /// Entries in receipt order.
    pub fn entries(&self) -> &[ResultEntry] {
        self.result.as_deref().unwrap_or(&[])
    }

    /// Finalized entries whose trimmed text is non-empty, in receipt order.
    pub fn final_texts(&self) -> impl Iterator<Item = &str> {
        self.entries()
            .iter()
            .filter(|e| e.is_final)
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
    }
}

/// Parses one inbound text message.
pub fn parse_message(raw: &str) -> serde_json::Result<ServerMessage> {
    serde_json::from_str(raw)
}
