use crate::kafka::connect::{establish, RetryPolicy};
use crate::kafka::formatter::MessageFormatter;
use crate::kafka::producer::{KafkaPublisher, Publisher};
use crate::kafka::settings::ProducerSettings;
use crate::router::{LogRecord, Route, RouteCloser, RouteTarget};
use crate::{Config, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// How a call to [`KafkaAdapter::stream`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The host closed the input channel.
    Drained,
    /// A record could not be formatted; the route was told to close.
    RouteClosed,
}

/// Publishes the records of one route to one Kafka topic.
pub struct KafkaAdapter<P = KafkaPublisher> {
    brokers: Vec<String>,
    formatter: MessageFormatter,
    publisher: P,
    route: Arc<dyn RouteCloser>,
}

impl KafkaAdapter<KafkaPublisher> {
    /// Resolves brokers and topic from `route`, compiles the message
    /// template, builds the producer configuration and connects, retrying
    /// as configured. Any failure here means no adapter is created.
    pub async fn connect(
        route: &Route,
        closer: Arc<dyn RouteCloser>,
        config: &Config,
    ) -> Result<Self> {
        let target = RouteTarget::parse(route)?;
        let formatter = MessageFormatter::new(&target.topic, config.template.as_deref())?;

        debug!(
            brokers = ?target.brokers,
            topic = %target.topic,
            "Starting Kafka producer"
        );

        let settings = ProducerSettings::from_config(config)?;
        let client_config = &settings.client_config(&target.brokers);
        let publisher = establish(RetryPolicy::from_config(config), move |attempt| {
            debug!(attempt, "Connecting to Kafka");
            KafkaPublisher::connect(client_config)
        })
        .await?;

        info!(
            brokers = ?target.brokers,
            topic = %target.topic,
            compression = settings.compression().as_str(),
            tls = settings.tls_enabled(),
            "Kafka adapter ready"
        );

        Ok(Self::new(target.brokers, formatter, publisher, closer))
    }
}

impl<P: Publisher> KafkaAdapter<P> {
    pub fn new(
        brokers: Vec<String>,
        formatter: MessageFormatter,
        publisher: P,
        route: Arc<dyn RouteCloser>,
    ) -> Self {
        Self {
            brokers,
            formatter,
            publisher,
            route,
        }
    }

    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }

    pub fn topic(&self) -> &str {
        self.formatter.topic()
    }

    /// Drains `logstream` into the publisher, one record at a time.
    ///
    /// A record that fails to format closes the route and ends the loop;
    /// the record is dropped. The publisher is closed before returning on
    /// every path.
    #[instrument(skip_all, fields(topic = %self.formatter.topic()))]
    pub async fn stream(mut self, mut logstream: mpsc::Receiver<LogRecord>) -> StreamOutcome {
        let mut outcome = StreamOutcome::Drained;
        let mut published: u64 = 0;

        while let Some(record) = logstream.recv().await {
            let message = match self.formatter.format(&record) {
                Ok(message) => message,
                Err(e) => {
                    error!(error = %e, "kafka: closing route, record could not be formatted");
                    self.route.close();
                    outcome = StreamOutcome::RouteClosed;
                    break;
                }
            };

            match self.publisher.publish(message).await {
                Ok(()) => published += 1,
                Err(e) => warn!(error = %e, "kafka: producer refused message, dropping it"),
            }
        }

        self.publisher.close().await;
        info!(published, outcome = ?outcome, "Log stream ended");

        outcome
    }
}
