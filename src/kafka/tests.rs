#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::Config;
    use crate::router::{LogRecord, Route, RouteTarget};
    use serde_json::json;

    fn create_test_config() -> Config {
        Config::from_vars([
            ("KAFKA_TEMPLATE", "{{ container.name }}|{{ source }}|{{ data }}"),
            ("KAFKA_COMPRESSION_CODEC", "gzip"),
            ("KAFKA_CONNECT_RETRIES", "1"),
        ])
        .unwrap()
    }

    fn create_test_record(data: &str) -> LogRecord {
        LogRecord::new(data)
            .with_source("stderr")
            .with_field(
                "container",
                json!({"id": "3f2a", "name": "api", "image": "api:latest"}),
            )
    }

    #[test]
    fn test_route_to_producer_config() {
        let config = create_test_config();
        let route = Route::from_uri("kafka://kafka-1:9092,kafka-2:9092/app-logs").unwrap();

        let target = RouteTarget::parse(&route).unwrap();
        let settings = ProducerSettings::from_config(&config).unwrap();
        let client_config = settings.client_config(&target.brokers);

        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(client_config.get("compression.codec"), Some("gzip"));
        assert_eq!(target.topic, "app-logs");
    }

    #[test]
    fn test_route_to_formatted_message() {
        let config = create_test_config();
        let route = Route::new("kafka-1:9092").with_option("topic", "app-logs");
        let target = RouteTarget::parse(&route).unwrap();

        let formatter = MessageFormatter::new(&target.topic, config.template.as_deref()).unwrap();
        let message = formatter.format(&create_test_record("boom")).unwrap();

        assert_eq!(message.topic, "app-logs");
        assert_eq!(&message.payload[..], b"api|stderr|boom");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = RetryPolicy::from_config(&create_test_config());
        assert_eq!(policy.attempts, 1);
        assert_eq!(policy.backoff, std::time::Duration::from_secs(1));

        assert_eq!(RetryPolicy::default().attempts, 3);
    }

    #[tokio::test]
    #[ignore] // Requires running Kafka
    async fn test_publisher_connect() {
        let settings = ProducerSettings::from_config(&Config::default()).unwrap();
        let client_config = settings.client_config(&["localhost:9092".to_string()]);

        let mut publisher = KafkaPublisher::connect(&client_config).await.unwrap();
        publisher
            .publish(OutboundMessage {
                topic: "logspout-kafka-test".to_string(),
                payload: bytes::Bytes::from_static(b"hello"),
            })
            .await
            .unwrap();
        publisher.close().await;
    }

    #[tokio::test]
    async fn test_publisher_connect_fails_without_brokers() {
        let settings = ProducerSettings::from_config(&Config::default()).unwrap();
        // Nothing listens on port 1.
        let client_config = settings.client_config(&["127.0.0.1:1".to_string()]);

        let result = KafkaPublisher::connect(&client_config).await;
        assert!(result.is_err());
    }
}
