use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A published message as stored by the broker and delivered to subscribers.
///
/// Serializes directly to the delivery frame `{"topic": ..., "message": ...,
/// "time": ...}`. `received_at` is the broker's intake time in epoch seconds;
/// any time field a publisher sends is ignored and overwritten at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    #[serde(rename = "message")]
    pub payload: Value,
    #[serde(rename = "time")]
    pub received_at: i64,
}

impl Message {
    /// Build a message stamped with the current wall-clock intake time.
    pub fn received_now(topic: &str, payload: Value) -> Self {
        Self {
            topic: topic.to_string(),
            payload,
            received_at: Utc::now().timestamp(),
        }
    }

    /// Age of the message in seconds relative to `now`.
    pub fn age_secs(&self, now: i64) -> i64 {
        now - self.received_at
    }
}
