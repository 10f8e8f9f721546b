use crate::kafka::Compression;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Adapter settings, assembled once at startup and threaded through the
/// producer configurator, the connection establisher and the formatter.
#[derive(Debug, Clone)]
pub struct Config {
    pub tls: Option<TlsFiles>,
    pub template: Option<String>,
    pub connect_attempts: u32,
    pub retry_backoff: Duration,
    pub compression: Compression,
    pub debug: bool,
}

/// Client certificate and private key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

/// Raw environment values, keyed by the lowercased variable name.
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    tls_cert_file: Option<String>,
    tls_privkey_file: Option<String>,
    kafka_template: Option<String>,
    kafka_connect_retries: Option<String>,
    kafka_compression_codec: Option<String>,
    debug: Option<String>,
}

impl Config {
    /// Reads `TLS_CERT_FILE`, `TLS_PRIVKEY_FILE`, `KAFKA_TEMPLATE`,
    /// `KAFKA_CONNECT_RETRIES`, `KAFKA_COMPRESSION_CODEC` and `DEBUG`
    /// from the process environment.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Same as [`Config::from_env`] but reads from an explicit list of
    /// `(VARIABLE, value)` pairs instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self::load(config::Environment::default().source(Some(source)))
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(environment)
            .build()?;

        let env: EnvSettings = settings.try_deserialize()?;
        Ok(Self::from_settings(env))
    }

    fn from_settings(env: EnvSettings) -> Self {
        let tls = match (non_empty(env.tls_cert_file), non_empty(env.tls_privkey_file)) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert_file: PathBuf::from(cert),
                key_file: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "TLS_CERT_FILE and TLS_PRIVKEY_FILE must be set together; TLS stays disabled"
                );
                None
            }
        };

        let connect_attempts = env
            .kafka_connect_retries
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|n| n.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or_else(default_connect_attempts);

        Self {
            tls,
            template: non_empty(env.kafka_template),
            connect_attempts,
            retry_backoff: default_retry_backoff(),
            compression: env
                .kafka_compression_codec
                .as_deref()
                .map(Compression::from_setting)
                .unwrap_or_default(),
            debug: non_empty(env.debug).is_some(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(EnvSettings::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn default_connect_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> Duration {
    Duration::from_secs(1)
}
