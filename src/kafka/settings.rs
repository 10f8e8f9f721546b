use crate::config::TlsFiles;
use crate::kafka::tls::TlsIdentity;
use crate::{Config, Result};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::debug;

/// Identity attached to every broker connection.
pub const CLIENT_ID: &str = "logspout";

/// Batches are flushed on this cadence rather than per message.
pub const FLUSH_FREQUENCY: Duration = Duration::from_secs(1);

/// Wait for the partition leader only; neither fire-and-forget (`0`) nor
/// every in-sync replica (`all`).
pub const REQUIRED_ACKS: &str = "1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Snappy,
}

impl Compression {
    /// Maps a `KAFKA_COMPRESSION_CODEC` value; anything unrecognised means
    /// no compression.
    pub fn from_setting(value: &str) -> Self {
        match value {
            "gzip" => Compression::Gzip,
            "snappy" => Compression::Snappy,
            _ => Compression::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Snappy => "snappy",
        }
    }
}

/// Producer configuration that does not depend on the route.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    compression: Compression,
    tls: Option<TlsIdentity>,
}

impl ProducerSettings {
    /// Builds the settings, loading and validating TLS material when both
    /// TLS files are configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        debug!("Generating Kafka configuration");

        let tls = match &config.tls {
            Some(files) => Some(load_tls(files)?),
            None => None,
        };

        Ok(Self {
            compression: config.compression,
            tls,
        })
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// librdkafka client configuration for the given bootstrap brokers.
    pub fn client_config(&self, brokers: &[String]) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", brokers.join(","))
            .set("client.id", CLIENT_ID)
            .set("acks", REQUIRED_ACKS)
            .set("linger.ms", FLUSH_FREQUENCY.as_millis().to_string())
            .set("compression.codec", self.compression.as_str());

        if let Some(tls) = &self.tls {
            tls.apply(&mut client_config);
        }

        client_config
    }
}

#[cfg(feature = "tls")]
fn load_tls(files: &TlsFiles) -> Result<TlsIdentity> {
    debug!("Enabling Kafka TLS support");
    TlsIdentity::load(&files.cert_file, &files.key_file)
}

#[cfg(not(feature = "tls"))]
fn load_tls(files: &TlsFiles) -> Result<TlsIdentity> {
    Err(crate::Error::Config(format!(
        "TLS_CERT_FILE ({}) is set but this build has no TLS support; rebuild with the `tls` feature",
        files.cert_file.display()
    )))
}
