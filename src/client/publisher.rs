use std::io;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{error, info};

use crate::transport::message::{ClientFrame, ClientType, encode};

/// Thin client that connects to a broker, identifies as a publisher, and
/// sends publish frames. Fire-and-forget: the broker never answers.
#[derive(Debug)]
pub struct Publisher {
    stream: TcpStream,
}

impl Publisher {
    /// Connect to the broker and identify as a publisher.
    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = match TcpStream::connect((host, port)).await {
            Ok(stream) => stream,
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                error!("connection refused, is the broker running?");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let mut publisher = Self { stream };
        publisher
            .send(&ClientFrame::Identify {
                client_type: ClientType::Publisher,
            })
            .await?;

        info!("connected to {}", publisher.stream.peer_addr()?);
        Ok(publisher)
    }

    /// Publish one message to a topic.
    pub async fn publish(&mut self, topic: &str, message: Value) -> io::Result<()> {
        self.send(&ClientFrame::Publish {
            topic: topic.to_string(),
            message,
        })
        .await
    }

    pub async fn disconnect(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    async fn send(&mut self, frame: &ClientFrame) -> io::Result<()> {
        let line = encode(frame).map_err(io::Error::other)?;
        self.stream.write_all(line.as_bytes()).await
    }
}
