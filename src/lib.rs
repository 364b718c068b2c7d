pub mod chart;
pub mod config;
pub mod driver;

pub use chart::{ChartError, Event, TelemetryChart};
pub use config::ChartOptions;
