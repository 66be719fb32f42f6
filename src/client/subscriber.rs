use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{error, info};

use crate::broker::message::Message;
use crate::transport::message::{ClientFrame, ClientType, encode};

/// Thin client that connects to a broker, identifies as a subscriber, joins
/// topics, and reads delivered frames one line at a time.
#[derive(Debug)]
pub struct Subscriber {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Subscriber {
    /// Connect to the broker and identify as a subscriber.
    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = match TcpStream::connect((host, port)).await {
            Ok(stream) => stream,
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                error!("connection refused, is the broker running?");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();
        let mut subscriber = Self {
            lines: BufReader::new(read_half).lines(),
            writer: write_half,
        };

        subscriber
            .send(&ClientFrame::Identify {
                client_type: ClientType::Subscriber,
            })
            .await?;

        info!("connected to {peer}");
        Ok(subscriber)
    }

    /// Join the given topics. Must be the first frame after identifying.
    pub async fn subscribe(&mut self, topics: &[String]) -> io::Result<()> {
        self.send(&ClientFrame::Subscribe {
            topics: topics.to_vec(),
        })
        .await
    }

    /// Next delivered message, or `None` once the broker closes the
    /// connection. Malformed lines are logged and skipped.
    pub async fn next_message(&mut self) -> io::Result<Option<Message>> {
        while let Some(line) = self.lines.next_line().await? {
            match serde_json::from_str::<Message>(&line) {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => error!("invalid message format: {e}"),
            }
        }
        Ok(None)
    }

    pub async fn disconnect(mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }

    async fn send(&mut self, frame: &ClientFrame) -> io::Result<()> {
        let line = encode(frame).map_err(io::Error::other)?;
        self.writer.write_all(line.as_bytes()).await
    }
}
