use std::collections::HashSet;

pub type ConnectionId = String;

/// A named channel in the relay.
///
/// Topics are created lazily on first publish or first subscription and live
/// for the rest of the process. A topic only tracks which connections want
/// its messages; the retained history lives in the retention buffer.
#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<ConnectionId>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Add a subscriber to the topic. Duplicate adds are a no-op.
    pub fn subscribe(&mut self, id: ConnectionId) {
        self.subscribers.insert(id);
    }

    /// Remove a subscriber from the topic.
    pub fn unsubscribe(&mut self, id: &ConnectionId) {
        self.subscribers.remove(id);
    }
}
