pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{TridiumError, TridiumResult};
pub use types::{AttributionModelKind, ChannelMetric, ReportRange};
