#![allow(dead_code)]

use async_trait::async_trait;
use logspout_kafka::kafka::{OutboundMessage, Publisher};
use logspout_kafka::router::{LogRecord, RouteCloser};
use logspout_kafka::Result;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Brokers for the ignored end-to-end tests.
pub fn test_brokers() -> Vec<String> {
    env::var("TEST_KAFKA_BROKERS")
        .unwrap_or_else(|_| "localhost:9092".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Unique topic per test process.
pub fn test_topic(name: &str) -> String {
    format!("logspout_test_{}_{}", name, std::process::id())
}

/// Publisher that remembers what it was given.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub published: Arc<Mutex<Vec<OutboundMessage>>>,
    pub closes: Arc<AtomicUsize>,
}

impl RecordingPublisher {
    pub fn payloads(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|m| String::from_utf8_lossy(&m.payload).into_owned())
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&mut self, message: OutboundMessage) -> Result<()> {
        self.published.lock().unwrap().push(message);
        Ok(())
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route handle that counts close signals.
#[derive(Default)]
pub struct CountingRoute {
    pub closes: AtomicUsize,
}

impl RouteCloser for CountingRoute {
    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl CountingRoute {
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A closed channel pre-loaded with `records`.
pub async fn feed(records: Vec<LogRecord>) -> mpsc::Receiver<LogRecord> {
    let (tx, rx) = mpsc::channel(records.len().max(1));
    for record in records {
        tx.send(record).await.unwrap();
    }
    rx
}
