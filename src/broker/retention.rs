//! Time-bounded message retention
//!
//! Each topic keeps its recently published messages in arrival order so that
//! subscribers joining late can be caught up. Eviction is lazy: it runs once
//! per publish to the topic, not on a background timer, so an idle topic may
//! hold expired entries until its next publish. Replay compensates by
//! filtering on age instead of trusting the buffer to be clean.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;

use crate::broker::message::Message;

#[derive(Debug)]
pub struct RetentionBuffer {
    messages: HashMap<String, VecDeque<Message>>,
    window_secs: i64,
}

impl RetentionBuffer {
    /// How long a message stays eligible for replay, in seconds.
    pub const DEFAULT_WINDOW_SECS: i64 = 30 * 60;

    pub fn new(window_secs: i64) -> Self {
        Self {
            messages: HashMap::new(),
            window_secs,
        }
    }

    /// Drop every retained message for `topic` whose age has reached the
    /// window. Called once per publish, before the new message is stored.
    pub fn evict_expired(&mut self, topic: &str) {
        let now = Utc::now().timestamp();
        if let Some(retained) = self.messages.get_mut(topic) {
            retained.retain(|msg| msg.age_secs(now) < self.window_secs);
        }
    }

    /// Append a message to its topic's history. The caller stamps
    /// `received_at`; storing does not re-stamp or reorder.
    pub fn store(&mut self, message: Message) {
        self.messages
            .entry(message.topic.clone())
            .or_default()
            .push_back(message);
    }

    /// Retained messages for `topic` still inside the window, in arrival
    /// order. Read-only: expired-but-unevicted entries are filtered out here
    /// but left in the buffer for the next eviction pass.
    pub fn recent(&self, topic: &str) -> Vec<&Message> {
        let now = Utc::now().timestamp();
        self.messages
            .get(topic)
            .map(|retained| {
                retained
                    .iter()
                    .filter(|msg| msg.age_secs(now) < self.window_secs)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of entries currently held for `topic`, expired or not.
    pub fn retained_count(&self, topic: &str) -> usize {
        self.messages.get(topic).map_or(0, VecDeque::len)
    }
}

impl Default for RetentionBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW_SECS)
    }
}
