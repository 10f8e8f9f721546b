use crate::kafka::formatter::OutboundMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long the broker probe may take before an attempt counts as failed.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before re-offering a message to a full producer queue.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(100);

/// Upper bound on the final flush when a stream ends.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// The asynchronous publisher the stream pump hands messages to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send {
    /// Enqueues one message. Waits while the publisher's buffer is full;
    /// does not wait for the broker to acknowledge the message.
    async fn publish(&mut self, message: OutboundMessage) -> Result<()>;

    /// Flushes what is buffered and releases the connection.
    async fn close(&mut self);
}

pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    /// Creates a producer and proves the brokers are reachable by fetching
    /// cluster metadata.
    pub async fn connect(client_config: &ClientConfig) -> Result<Self> {
        let producer: FutureProducer = client_config.create()?;

        let probe = producer.clone();
        let broker_count = tokio::task::spawn_blocking(move || {
            probe
                .client()
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map(|metadata| metadata.brokers().len())
        })
        .await
        .map_err(|e| Error::Connection(format!("Metadata probe aborted: {}", e)))??;

        if broker_count == 0 {
            return Err(Error::Connection(
                "Cluster metadata lists no brokers".to_string(),
            ));
        }

        debug!(brokers = broker_count, "Connected to Kafka cluster");
        Ok(Self { producer })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&mut self, message: OutboundMessage) -> Result<()> {
        let mut record: FutureRecord<'_, (), [u8]> =
            FutureRecord::to(&message.topic).payload(message.payload.as_ref());

        loop {
            match self.producer.send_result(record) {
                // Delivery reports are not consumed; dropping the future
                // leaves the message queued in librdkafka.
                Ok(_delivery) => return Ok(()),
                Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), rejected)) => {
                    record = rejected;
                }
                Err((e, _)) => return Err(Error::Kafka(e)),
            }

            debug!(topic = %message.topic, "Producer queue full, waiting");
            tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
        }
    }

    async fn close(&mut self) {
        let producer = self.producer.clone();
        let flushed = tokio::task::spawn_blocking(move || {
            producer.flush(Timeout::After(CLOSE_FLUSH_TIMEOUT))
        })
        .await;

        match flushed {
            Ok(Ok(())) => info!("Kafka producer closed"),
            Ok(Err(e)) => warn!(error = %e, "Kafka producer closed with undelivered messages"),
            Err(e) => warn!(error = %e, "Kafka producer flush aborted"),
        }
    }
}
