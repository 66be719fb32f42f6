use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::broker::topic::ConnectionId;

/// The broker's handle on a registered subscriber connection.
///
/// The sender carries pre-encoded frame lines to the connection's write
/// task; a failed send means the connection is gone and the broker purges it.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the connection (`client-<uuid>`).
    pub id: ConnectionId,

    /// Channel to the connection's outbound write task.
    pub sender: UnboundedSender<String>,
}

impl Client {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self::with_id(format!("client-{}", Uuid::new_v4()), sender)
    }

    pub fn with_id(id: ConnectionId, sender: UnboundedSender<String>) -> Self {
        Self { id, sender }
    }
}
