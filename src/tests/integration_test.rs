//! End-to-end tests over real TCP, driving the broker with the client stubs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use tokio::time::{sleep, timeout};

use crate::broker::Broker;
use crate::client::{Publisher, Subscriber};
use crate::transport::tcp::start_tcp_server;

const HOST: &str = "127.0.0.1";

async fn start_broker(port: u16) -> Arc<Mutex<Broker>> {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let server_broker = broker.clone();
    tokio::spawn(async move {
        let _ = start_tcp_server(&format!("{HOST}:{port}"), server_broker).await;
    });
    sleep(Duration::from_millis(200)).await;
    broker
}

async fn wait_for_subscribers(broker: &Arc<Mutex<Broker>>, topic: &str, count: usize) {
    for _ in 0..100 {
        {
            let broker = broker.lock().unwrap();
            if broker
                .topics
                .get(topic)
                .is_some_and(|t| t.subscribers.len() >= count)
            {
                return;
            }
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("subscribers never registered on topic {topic}");
}

async fn wait_for_retained(broker: &Arc<Mutex<Broker>>, topic: &str, count: usize) {
    for _ in 0..100 {
        if broker.lock().unwrap().retention.retained_count(topic) >= count {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("messages never retained on topic {topic}");
}

#[tokio::test]
#[serial]
async fn integration_pubsub_end_to_end() {
    let port = 38551;
    let broker = start_broker(port).await;

    let mut sub_a = Subscriber::connect(HOST, port).await.expect("A connect");
    sub_a.subscribe(&["cars".to_string()]).await.expect("A subscribe");
    let mut sub_b = Subscriber::connect(HOST, port).await.expect("B connect");
    sub_b.subscribe(&["cars".to_string()]).await.expect("B subscribe");
    wait_for_subscribers(&broker, "cars", 2).await;

    let mut publisher = Publisher::connect(HOST, port).await.expect("pub connect");
    publisher.publish("cars", json!("hi")).await.expect("publish");

    for sub in [&mut sub_a, &mut sub_b] {
        let msg = timeout(Duration::from_secs(2), sub.next_message())
            .await
            .expect("timed out waiting for delivery")
            .expect("read failed")
            .expect("connection closed");
        assert_eq!(msg.topic, "cars");
        assert_eq!(msg.payload, json!("hi"));
        assert!(msg.received_at > 0);
    }
}

#[tokio::test]
#[serial]
async fn integration_late_subscriber_gets_recent_history() {
    let port = 38552;
    let broker = start_broker(port).await;

    let mut publisher = Publisher::connect(HOST, port).await.expect("pub connect");
    publisher.publish("cars", json!("first")).await.expect("publish");
    wait_for_retained(&broker, "cars", 1).await;

    let mut subscriber = Subscriber::connect(HOST, port).await.expect("sub connect");
    subscriber.subscribe(&["cars".to_string()]).await.expect("subscribe");
    wait_for_subscribers(&broker, "cars", 1).await;

    publisher.publish("cars", json!("second")).await.expect("publish");

    // History replays first, then live fan-out, in arrival order.
    for expected in ["first", "second"] {
        let msg = timeout(Duration::from_secs(2), subscriber.next_message())
            .await
            .expect("timed out waiting for delivery")
            .expect("read failed")
            .expect("connection closed");
        assert_eq!(msg.topic, "cars");
        assert_eq!(msg.payload, json!(expected));
    }
}

#[tokio::test]
#[serial]
async fn integration_binding_same_port_twice_fails_cleanly() {
    let port = 38553;
    let _broker = start_broker(port).await;

    let second = Arc::new(Mutex::new(Broker::new()));
    let result = start_tcp_server(&format!("{HOST}:{port}"), second).await;
    assert!(result.is_err(), "second bind should fail");
}
