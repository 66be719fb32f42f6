//! TCP server and connection handling
//!
//! One task per accepted connection. A fresh connection has one second to
//! identify itself as a publisher or a subscriber; silent or unrecognized
//! connections are dropped. Publishers are read in a loop and their frames
//! routed through the broker; subscribers hand their socket to a write-only
//! pump fed by the broker through an unbounded channel, and are never read
//! again after their topic list.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info};
use uuid::Uuid;

use crate::broker::Broker;
use crate::broker::topic::ConnectionId;
use crate::client::Client;
use crate::transport::message::{self, ClientFrame, ClientType};

/// How long a fresh connection has to send its identify frame.
pub const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(1);

/// Bind the listener and serve until the accept loop fails or the future is
/// dropped. A bind failure is returned without starting the loop.
pub async fn start_tcp_server(addr: &str, broker: Arc<Mutex<Broker>>) -> io::Result<()> {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            error!("specified address and port are already in use: {addr}");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    info!("pubsub broker started on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("client connected from {peer}");
        tokio::spawn(handle_connection(stream, broker.clone()));
    }
}

/// Drive one connection from classification to close.
pub(crate) async fn handle_connection<S>(stream: S, broker: Arc<Mutex<Broker>>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut lines = BufReader::new(read_half).lines();
    let client_id = format!("client-{}", Uuid::new_v4());

    let Some(client_type) = classify(&mut lines).await else {
        return;
    };
    info!("client {client_id} identified as {client_type}");

    match client_type {
        ClientType::Publisher => run_publisher(lines, broker, client_id).await,
        ClientType::Subscriber => run_subscriber(lines, write_half, broker, client_id).await,
    }
}

/// Wait up to [`IDENTIFY_TIMEOUT`] for the first frame and read the declared
/// role out of it. Any other outcome closes the connection.
async fn classify<R>(lines: &mut Lines<BufReader<R>>) -> Option<ClientType>
where
    R: AsyncRead + Unpin,
{
    let line = match timeout(IDENTIFY_TIMEOUT, lines.next_line()).await {
        Err(_) => {
            info!("client is not identifying, closing connection");
            return None;
        }
        Ok(Ok(Some(line))) => line,
        Ok(Ok(None)) => {
            info!("client disconnected before identifying");
            return None;
        }
        Ok(Err(e)) => {
            error!("failed to read identify frame: {e}");
            return None;
        }
    };

    match message::decode(&line) {
        Ok(ClientFrame::Identify { client_type }) => Some(client_type),
        Ok(_) => {
            info!("client did not identify a role, closing connection");
            None
        }
        Err(e) => {
            error!("invalid identify frame: {e}");
            None
        }
    }
}

/// Read publish frames until the publisher goes away. Malformed lines are
/// logged and dropped without touching the connection; non-publish shapes
/// are discarded silently.
async fn run_publisher<R>(
    mut lines: Lines<BufReader<R>>,
    broker: Arc<Mutex<Broker>>,
    client_id: ConnectionId,
) where
    R: AsyncRead + Unpin,
{
    broker.lock().unwrap().register_publisher(client_id.clone());

    while let Ok(Some(line)) = lines.next_line().await {
        match message::decode(&line) {
            Ok(ClientFrame::Publish { topic, message }) => {
                broker.lock().unwrap().route_published(&topic, message);
            }
            Ok(_) => {}
            Err(e) => error!("invalid frame from {client_id}: {e}"),
        }
    }

    broker.lock().unwrap().remove_publisher(&client_id);
    info!("publisher {client_id} disconnected");
}

/// Read the topic list, register with the broker (which replays retained
/// history), then pump broker-encoded lines to the socket until either end
/// goes away. The subscriber's socket is never read again.
async fn run_subscriber<R, W>(
    mut lines: Lines<BufReader<R>>,
    mut write_half: W,
    broker: Arc<Mutex<Broker>>,
    client_id: ConnectionId,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let topics = match lines.next_line().await {
        Ok(Some(line)) => match message::decode(&line) {
            Ok(ClientFrame::Subscribe { topics }) => topics,
            Ok(_) | Err(_) => {
                error!("subscriber {client_id} sent no topic list, closing connection");
                return;
            }
        },
        _ => return,
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    broker
        .lock()
        .unwrap()
        .register_subscriber(Client::with_id(client_id.clone(), tx), &topics);

    while let Some(line) = rx.recv().await {
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            error!("failed to write to subscriber {client_id}: {e}");
            break;
        }
    }

    broker.lock().unwrap().remove_subscriber(&client_id);
    info!("subscriber {client_id} disconnected");
}
