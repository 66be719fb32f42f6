//! Wire codec
//!
//! Every frame on the wire is one JSON object on one line, UTF-8,
//! newline-delimited. Inbound frames have no type tag; they are recognized by
//! shape, in order: an identify frame carries `client_type`, a subscribe
//! frame carries `topics`, and a publish frame carries `topic` + `message`.
//! Anything that matches none of the shapes is a decode error the caller
//! logs and drops.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role a connection declares in its first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Publisher,
    Subscriber,
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientType::Publisher => write!(f, "publisher"),
            ClientType::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// Frames a client may send to the broker. Unknown JSON fields are ignored,
/// so a publisher-supplied `time` on a publish frame is simply dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientFrame {
    Identify { client_type: ClientType },
    Subscribe { topics: Vec<String> },
    Publish { topic: String, message: Value },
}

/// Encode a value as one newline-terminated JSON frame.
pub fn encode<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut frame = serde_json::to_string(value)?;
    frame.push('\n');
    Ok(frame)
}

/// Decode one received line into a client frame. Malformed input is an
/// ordinary `Err`, never a panic.
pub fn decode(line: &str) -> Result<ClientFrame, serde_json::Error> {
    serde_json::from_str(line.trim())
}
