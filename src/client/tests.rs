use tokio::sync::mpsc;

use super::handle::Client;

#[test]
fn test_client_new_assigns_id() {
    let (tx, _rx) = mpsc::unbounded_channel::<String>();
    let client = Client::new(tx);
    assert!(client.id.starts_with("client-"));
}

#[test]
fn test_client_with_id_keeps_id() {
    let (tx, _rx) = mpsc::unbounded_channel::<String>();
    let client = Client::with_id("client-42".to_string(), tx);
    assert_eq!(client.id, "client-42");
}

#[test]
fn test_client_sender_delivers_lines() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let client = Client::new(tx);

    client.sender.send("{\"topic\":\"cars\"}\n".to_string()).unwrap();
    assert_eq!(rx.try_recv().unwrap(), "{\"topic\":\"cars\"}\n");
}
