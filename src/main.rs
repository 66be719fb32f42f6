//! CLI for RelaySub
//!
//! Subcommands:
//! - `broker`: run the pub/sub broker on a port
//! - `publisher`: interactive front end that publishes stdin lines
//! - `subscriber`: join topics and print delivered messages

use std::error::Error;
use std::sync::{Arc, Mutex};

use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use relaysub::broker::Broker;
use relaysub::client::{Publisher, Subscriber};
use relaysub::config::load_config;
use relaysub::transport::tcp::start_tcp_server;

const CLIENT_HOST: &str = "127.0.0.1";

#[derive(Parser)]
#[command(name = "relaysub")]
enum Command {
    /// Start the broker, listening on the given port
    Broker { port: u16 },
    /// Publish interactively: each stdin line is "<topic> <message>"
    Publisher { port: u16 },
    /// Subscribe to topics and print every delivered message
    Subscriber {
        port: u16,
        #[arg(required = true)]
        topics: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    relaysub::utils::logging::init("info");

    let cmd = Command::parse();

    let result = match cmd {
        Command::Broker { port } => run_broker(port).await,
        Command::Publisher { port } => run_publisher(port).await,
        Command::Subscriber { port, topics } => run_subscriber(port, topics).await,
    };

    if let Err(e) = result {
        error!("exited with error: {e}");
        std::process::exit(1);
    }
}

async fn run_broker(port: u16) -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    let addr = format!("{}:{}", config.server.host, port);
    let broker = Arc::new(Mutex::new(Broker::with_retention_window(
        config.broker.retention_secs,
    )));

    tokio::select! {
        res = start_tcp_server(&addr, broker) => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, exiting");
        }
    }

    Ok(())
}

async fn run_publisher(port: u16) -> Result<(), Box<dyn Error>> {
    let mut publisher = Publisher::connect(CLIENT_HOST, port).await?;
    println!("Enter a message ('q' or Ctrl-C to exit).");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "q" {
                    break;
                }

                let (topic, message) = match input.split_once(' ') {
                    Some((topic, message)) => (topic, message),
                    None => (input, ""),
                };
                publisher
                    .publish(topic, Value::String(message.to_string()))
                    .await?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    publisher.disconnect().await?;
    Ok(())
}

async fn run_subscriber(port: u16, topics: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut subscriber = Subscriber::connect(CLIENT_HOST, port).await?;
    subscriber.subscribe(&topics).await?;
    println!("Type ^C to exit.");

    loop {
        tokio::select! {
            msg = subscriber.next_message() => {
                let Some(msg) = msg? else { break };
                match &msg.payload {
                    Value::String(text) => println!("#{}: {}", msg.topic, text),
                    other => println!("#{}: {}", msg.topic, other),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscriber.disconnect().await?;
    Ok(())
}
