use crate::{Config, Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded, fixed-delay retry used while the producer is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.connect_attempts,
            backoff: config.retry_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs `connect` until it succeeds or `policy.attempts` attempts have
/// failed, sleeping `policy.backoff` between attempts.
///
/// `connect` receives the 1-based attempt number. Returns immediately on
/// success; after the last failure the cause is wrapped in
/// [`Error::ProducerUnavailable`].
pub async fn establish<T, F, Fut>(policy: RetryPolicy, mut connect: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect(attempt).await {
            Ok(producer) => {
                debug!(attempt, "Kafka producer created");
                return Ok(producer);
            }
            Err(e) if attempt >= attempts => {
                return Err(Error::ProducerUnavailable {
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    attempts,
                    error = %e,
                    "Couldn't create Kafka producer. Retrying..."
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
        }
    }
}
