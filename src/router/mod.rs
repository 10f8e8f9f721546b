pub mod record;
pub mod route;

pub use record::LogRecord;
pub use route::{read_brokers, read_topic, Route, RouteCloser, RouteTarget};
