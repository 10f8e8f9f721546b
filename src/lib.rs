pub mod config;
pub mod error;

pub mod kafka;
pub mod router;

pub use config::Config;
pub use error::{Error, Result};
pub use kafka::KafkaAdapter;

/// Name under which hosts register this adapter.
pub const ADAPTER_NAME: &str = "kafka";
