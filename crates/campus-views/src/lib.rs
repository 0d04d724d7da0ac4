pub mod dashboard;
pub mod monitoring;
pub mod reads;
pub mod slot;

#[cfg(test)]
mod test_support;

pub use dashboard::{DashboardData, DashboardPayload, DashboardView};
pub use monitoring::{MonitoringData, MonitoringPayload, MonitoringView};
pub use slot::Slot;
