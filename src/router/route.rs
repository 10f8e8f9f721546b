use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOPIC_SEPARATOR: char = '/';
const BROKER_SEPARATOR: char = ',';
const TOPIC_OPTION: &str = "topic";

/// A host-defined binding from a log source to an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub adapter: String,
    pub address: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// Signal back to the host that a route should be shut down.
///
/// The adapter calls this at most once, when a record cannot be formatted.
/// The host is expected to stop feeding the route and drop its sender.
#[cfg_attr(test, mockall::automock)]
pub trait RouteCloser: Send + Sync {
    fn close(&self);
}

impl Route {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            adapter: crate::ADAPTER_NAME.to_string(),
            address: address.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Parses the `adapter://address?key=value&...` form used on the
    /// command line, e.g. `kafka://broker1:9092,broker2:9092/logs`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let (adapter, rest) = uri.split_once("://").ok_or_else(|| {
            Error::Config(format!("Route {:?} is not of the form adapter://address", uri))
        })?;

        if adapter.is_empty() {
            return Err(Error::Config(format!("Route {:?} names no adapter", uri)));
        }

        let (address, query) = match rest.split_once('?') {
            Some((address, query)) => (address, Some(query)),
            None => (rest, None),
        };

        let options = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        Ok(Self {
            adapter: adapter.to_string(),
            address: address.to_string(),
            options,
        })
    }
}

/// Brokers and topic resolved from a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub brokers: Vec<String>,
    pub topic: String,
}

impl RouteTarget {
    pub fn parse(route: &Route) -> Result<Self> {
        let brokers = read_brokers(&route.address);
        if brokers.is_empty() {
            return Err(Error::Config(
                "The Kafka broker host:port is missing. Did you specify it as a route address?"
                    .to_string(),
            ));
        }

        let topic = read_topic(&route.address, &route.options).ok_or_else(|| {
            Error::Config(
                "The Kafka topic is missing. Did you specify it as a route option?".to_string(),
            )
        })?;

        Ok(Self { brokers, topic })
    }
}

/// Broker endpoints in the part of `address` before the first `/`.
pub fn read_brokers(address: &str) -> Vec<String> {
    let list = match address.split_once(TOPIC_SEPARATOR) {
        Some((list, _)) => list,
        None => address,
    };

    list.split(BROKER_SEPARATOR)
        .filter(|broker| !broker.is_empty())
        .map(str::to_string)
        .collect()
}

/// Everything after the first `/` in `address`, or the `topic` option when
/// the address carries no topic.
pub fn read_topic(address: &str, options: &HashMap<String, String>) -> Option<String> {
    let topic = match address.split_once(TOPIC_SEPARATOR) {
        Some((_, topic)) => topic,
        None => options.get(TOPIC_OPTION).map(String::as_str).unwrap_or_default(),
    };

    (!topic.is_empty()).then(|| topic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noopts() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_read_route_address() {
        let brokers = read_brokers("broker1:9092,broker2:9092");
        assert_eq!(brokers, vec!["broker1:9092", "broker2:9092"]);
    }

    #[test]
    fn test_read_route_address_with_a_slash_topic() {
        let address = "broker/hello";
        assert_eq!(read_brokers(address), vec!["broker"]);
        assert_eq!(read_topic(address, &noopts()).as_deref(), Some("hello"));
    }

    #[test]
    fn test_read_topic_option() {
        let opts = HashMap::from([("topic".to_string(), "hello".to_string())]);
        assert_eq!(read_topic("", &opts).as_deref(), Some("hello"));
        assert!(read_brokers("").is_empty());
    }

    #[test]
    fn test_slash_topic_trumps_a_topic_option() {
        let opts = HashMap::from([("topic".to_string(), "trumped".to_string())]);
        assert_eq!(read_topic("broker/hello", &opts).as_deref(), Some("hello"));
    }

    #[test]
    fn test_topic_is_everything_after_the_first_slash() {
        let address = "b1:9092,b2:9092/logs/app,web";
        assert_eq!(read_brokers(address), vec!["b1:9092", "b2:9092"]);
        assert_eq!(read_topic(address, &noopts()).as_deref(), Some("logs/app,web"));
    }

    #[test]
    fn test_missing_topic_is_an_error() {
        let route = Route::new("broker1:9092,broker2:9092");
        let err = RouteTarget::parse(&route).unwrap_err();
        assert!(err.to_string().contains("topic is missing"));

        let route = Route::new("broker1:9092/");
        assert!(RouteTarget::parse(&route).is_err());
    }

    #[test]
    fn test_missing_brokers_is_an_error() {
        let route = Route::new("").with_option("topic", "hello");
        let err = RouteTarget::parse(&route).unwrap_err();
        assert!(err.to_string().contains("broker host:port is missing"));
    }

    #[test]
    fn test_parse_route_target() {
        let route = Route::new("k1:9092,k2:9092").with_option("topic", "containers");
        let target = RouteTarget::parse(&route).unwrap();
        assert_eq!(target.brokers, vec!["k1:9092", "k2:9092"]);
        assert_eq!(target.topic, "containers");
    }

    #[test]
    fn test_route_from_uri() {
        let route = Route::from_uri("kafka://k1:9092,k2:9092/logs?topic=ignored&debug").unwrap();
        assert_eq!(route.adapter, "kafka");
        assert_eq!(route.address, "k1:9092,k2:9092/logs");
        assert_eq!(route.options.get("topic").map(String::as_str), Some("ignored"));
        assert_eq!(route.options.get("debug").map(String::as_str), Some(""));

        let target = RouteTarget::parse(&route).unwrap();
        assert_eq!(target.topic, "logs");
    }

    #[test]
    fn test_route_from_uri_requires_scheme() {
        assert!(Route::from_uri("k1:9092/logs").is_err());
        assert!(Route::from_uri("://k1:9092/logs").is_err());
    }
}
