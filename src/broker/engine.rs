//! Broker engine
//!
//! The broker owns all mutable relay state: the topic map, the publisher set,
//! the per-connection outbound handles, and the retention buffer. The public
//! API is synchronous and meant to be held behind a lock
//! (`Arc<Mutex<Broker>>`) by the transport layer; every operation runs to
//! completion under that lock, so publish intake is totally ordered and no
//! finer-grained synchronization is needed.

use std::collections::{HashMap, HashSet};

use tracing::{error, info};

use crate::broker::message::Message;
use crate::broker::retention::RetentionBuffer;
use crate::broker::topic::{ConnectionId, Topic};
use crate::client::Client;
use crate::transport::message::encode;

#[derive(Debug, Default)]
pub struct Broker {
    pub topics: HashMap<String, Topic>,
    pub publishers: HashSet<ConnectionId>,
    pub subscribers: HashMap<ConnectionId, Client>,
    pub retention: RetentionBuffer,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broker with a non-default retention window, in seconds.
    pub fn with_retention_window(window_secs: i64) -> Self {
        Self {
            retention: RetentionBuffer::new(window_secs),
            ..Self::default()
        }
    }

    /// Track a classified publisher connection. Publishers get no
    /// acknowledgment and never receive fan-out traffic.
    pub fn register_publisher(&mut self, id: ConnectionId) {
        self.publishers.insert(id);
    }

    pub fn remove_publisher(&mut self, id: &ConnectionId) {
        self.publishers.remove(id);
    }

    /// Register a classified subscriber on the given topics, creating topics
    /// as needed, then replay retained history for exactly those topics, in
    /// the order they were listed.
    pub fn register_subscriber(&mut self, client: Client, topics: &[String]) {
        let id = client.id.clone();
        self.subscribers.insert(id.clone(), client);

        for name in topics {
            self.topics
                .entry(name.clone())
                .or_insert_with(|| Topic::new(name))
                .subscribe(id.clone());
        }

        for name in topics {
            if !self.replay(&id, name) {
                return;
            }
        }
    }

    /// Send every still-fresh retained message for `topic` to one subscriber,
    /// in arrival order. Returns false if the subscriber went away mid-replay
    /// and was purged.
    fn replay(&mut self, id: &ConnectionId, topic: &str) -> bool {
        let Some(client) = self.subscribers.get(id) else {
            return false;
        };

        let mut failed = false;
        for msg in self.retention.recent(topic) {
            let line = match encode(msg) {
                Ok(line) => line,
                Err(e) => {
                    error!("failed to serialize retained message: {e}");
                    continue;
                }
            };
            if client.sender.send(line).is_err() {
                failed = true;
                break;
            }
        }

        if failed {
            error!("connection lost during replay, disconnecting {id}");
            self.remove_subscriber(id);
            return false;
        }
        true
    }

    /// Take in one published frame: stamp the intake time, evict expired
    /// history for the topic, retain the message, and fan it out to every
    /// current subscriber of the topic.
    pub fn route_published(&mut self, topic: &str, payload: serde_json::Value) {
        if topic.is_empty() {
            error!("dropping publish with empty topic name");
            return;
        }

        let msg = Message::received_now(topic, payload);

        self.retention.evict_expired(topic);
        self.retention.store(msg.clone());

        let topic_entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic));

        let line = match encode(&msg) {
            Ok(line) => line,
            Err(e) => {
                error!("failed to serialize message: {e}");
                return;
            }
        };

        let mut dead = Vec::new();
        for sub_id in &topic_entry.subscribers {
            match self.subscribers.get(sub_id) {
                Some(client) => {
                    if client.sender.send(line.clone()).is_err() {
                        dead.push(sub_id.clone());
                    }
                }
                None => dead.push(sub_id.clone()),
            }
        }

        // A single write failure purges the connection from every topic it
        // belonged to, not just the one that failed.
        for sub_id in dead {
            error!("connection lost, disconnecting {sub_id}");
            self.remove_subscriber(&sub_id);
        }
    }

    /// Purge a subscriber from every topic's subscriber set and drop its
    /// outbound handle. Used on write failure and on disconnect.
    pub fn remove_subscriber(&mut self, id: &ConnectionId) {
        if self.subscribers.remove(id).is_none() {
            return;
        }

        for topic in self.topics.values_mut() {
            topic.unsubscribe(id);
        }

        info!("cleaned up subscriber {id}");
    }
}
