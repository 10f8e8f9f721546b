//! Error types and result handling for logspout-kafka.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use logspout_kafka::{Error, Result};
//!
//! fn resolve_topic() -> Result<String> {
//!     Err(Error::Config("The Kafka topic is missing".to_string()))
//! }
//!
//! match resolve_topic() {
//!     Ok(topic) => println!("Publishing to {}", topic),
//!     Err(Error::Config(msg)) => eprintln!("Configuration error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for logspout-kafka operations.
///
/// Construction-time failures (route, settings, TLS, connect) and the
/// per-record formatting failures raised by the stream pump all share
/// this type.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid route, template or other adapter configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The environment-style settings could not be loaded.
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// A TLS certificate or key file could not be opened or read.
    #[error("Couldn't read TLS {what} file {path:?}: {source}")]
    TlsFile {
        /// Which half of the keypair failed ("certificate" or "private key")
        what: &'static str,
        /// Path taken from the environment
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TLS material was read but does not form a usable keypair.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Kafka client or producer error.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Broker endpoints could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Every connection attempt failed.
    #[error("Couldn't create Kafka producer after {attempts} attempt(s): {source}")]
    ProducerUnavailable {
        /// Number of attempts made
        attempts: u32,
        /// Cause reported by the last attempt
        #[source]
        source: Box<Error>,
    },

    /// A log record could not be rendered through the message template.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// JSON serialization error when building a template context.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenient Result type alias for logspout-kafka operations.
///
/// This is equivalent to `std::result::Result<T, logspout_kafka::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
