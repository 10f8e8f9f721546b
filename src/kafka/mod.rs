pub mod adapter;
pub mod connect;
pub mod formatter;
pub mod producer;
pub mod settings;
pub mod tls;

#[cfg(test)]
mod tests;

pub use adapter::{KafkaAdapter, StreamOutcome};
pub use connect::{establish, RetryPolicy};
pub use formatter::{MessageFormatter, OutboundMessage};
pub use producer::{KafkaPublisher, Publisher};
pub use settings::{Compression, ProducerSettings};
pub use tls::TlsIdentity;
