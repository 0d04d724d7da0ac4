pub mod auth;
pub mod dashboard;
pub mod monitoring;

pub use auth::{LoginResponse, User, UserId};
pub use dashboard::{
    AiRecommendation, DeviceStatus, DeviceStatusEntry, Metric, MetricValue, PowerFlowPoint, Trend,
};
pub use monitoring::{EnergyFlowPoint, MonitoredDevice, ParseTimeRangeError, TimeRange};
