use crate::router::LogRecord;
use crate::{Error, Result};
use bytes::Bytes;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "kafka";

/// A message ready to be handed to the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Bytes,
}

/// Turns log records into Kafka payloads for a single topic.
///
/// With a template, each record is rendered through it; the record's fields
/// (`data`, `source`, `time` and anything the host attached, e.g.
/// `container.name`) are the template variables. Without a template the
/// payload is the record's raw `data`.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    topic: String,
    template: Option<Tera>,
}

impl MessageFormatter {
    pub fn new(topic: impl Into<String>, template: Option<&str>) -> Result<Self> {
        let template = match template {
            Some(text) => {
                let mut tera = Tera::default();
                tera.add_raw_template(TEMPLATE_NAME, text).map_err(|e| {
                    Error::Config(format!("Couldn't parse Kafka message template. {}", e))
                })?;
                Some(tera)
            }
            None => None,
        };

        Ok(Self {
            topic: topic.into(),
            template,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn format(&self, record: &LogRecord) -> Result<OutboundMessage> {
        let payload = match &self.template {
            Some(tera) => {
                let context = Context::from_value(serde_json::to_value(record)?)?;
                Bytes::from(tera.render(TEMPLATE_NAME, &context)?)
            }
            None => Bytes::copy_from_slice(record.data.as_bytes()),
        };

        Ok(OutboundMessage {
            topic: self.topic.clone(),
            payload,
        })
    }
}
