pub mod gauge;
pub mod metric_card;

pub use gauge::{GaugeConfig, LoadGauge};
pub use metric_card::MetricCard;
