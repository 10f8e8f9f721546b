use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Names owned by the typed fields; extra fields may not reuse them.
pub const RESERVED_FIELDS: [&str; 3] = ["data", "source", "time"];

/// One log line as handed over by the host.
///
/// `data` is the raw text. Everything the host attaches besides `source`
/// and `time` (container metadata, labels, ...) lands in `fields` and is
/// visible to message templates at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub data: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "Utc::now")]
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            source: String::new(),
            time: Utc::now(),
            fields: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Attaches an extra field. Reserved names are ignored so the record
    /// always serializes to a single `data`, `source` and `time` key each.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if RESERVED_FIELDS.contains(&name.as_str()) {
            warn!(field = %name, "Ignoring extra log record field with a reserved name");
            return self;
        }
        self.fields.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_are_flattened() {
        let line = r#"{"data":"hello","source":"stdout","container":{"name":"web"}}"#;
        let record: LogRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.data, "hello");
        assert_eq!(record.source, "stdout");
        assert_eq!(record.fields["container"]["name"], "web");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["container"], json!({"name": "web"}));
        assert!(value["time"].is_string());
    }

    #[test]
    fn test_reserved_field_names_are_ignored() {
        let record = LogRecord::new("hello")
            .with_source("stderr")
            .with_field("data", json!("shadow"))
            .with_field("time", json!("yesterday"))
            .with_field("source", json!(1))
            .with_field("level", json!("info"));

        assert_eq!(record.data, "hello");
        assert_eq!(record.source, "stderr");
        assert_eq!(record.fields.len(), 1);

        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(line.matches("\"data\"").count(), 1);
        assert_eq!(line.matches("\"time\"").count(), 1);

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["data"], "hello");
        assert_eq!(value["level"], "info");
        assert_eq!(value["time"], json!(record.time));
    }
}
