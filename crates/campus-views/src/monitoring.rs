use campus_client::EnergyApi;
use campus_poll::{PollController, PollError, PollRead, PollState, ReadFailure, RoundReport};
use campus_types::{EnergyFlowPoint, MonitoredDevice, TimeRange};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::reads::api_read;
use crate::Slot;

pub const READ_DEVICES: &str = "devices";
pub const READ_ENERGY_FLOWS: &str = "energy-flows";

const DEVICES_ERROR: &str = "Failed to load device status.";
const ENERGY_FLOWS_ERROR: &str = "Failed to load energy flow data.";

#[derive(Debug, Clone)]
pub enum MonitoringPayload {
    Devices(Vec<MonitoredDevice>),
    EnergyFlows(Vec<EnergyFlowPoint>),
}

/// 实时监控页的数据
#[derive(Debug, Clone, Default)]
pub struct MonitoringData {
    pub time_range: TimeRange,
    pub devices: Slot<Vec<MonitoredDevice>>,
    pub energy_flows: Slot<Vec<EnergyFlowPoint>>,
    pub round: u64,
}

impl MonitoringData {
    fn apply(&mut self, report: &RoundReport<MonitoringPayload>) {
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(MonitoringPayload::Devices(devices)) => {
                    self.devices.settle_or_fail(Ok(devices.clone()), DEVICES_ERROR)
                }
                Ok(MonitoringPayload::EnergyFlows(points)) => {
                    self.energy_flows.settle_or_fail(Ok(points.clone()), ENERGY_FLOWS_ERROR)
                }
                Err(failure) => self.fail(failure),
            }
        }
        self.round = report.round;
    }

    fn fail(&mut self, failure: &ReadFailure) {
        match failure.read.as_str() {
            READ_DEVICES => self.devices.settle_or_fail(Err(failure), DEVICES_ERROR),
            READ_ENERGY_FLOWS => self.energy_flows.settle_or_fail(Err(failure), ENERGY_FLOWS_ERROR),
            other => warn!(read = %other, "Unknown monitoring read"),
        }
    }

    /// (在线数, 总数)
    pub fn online_devices(&self) -> Option<(usize, usize)> {
        let devices = self.devices.value()?;
        let online = devices.iter().filter(|d| d.is_online()).count();
        Some((online, devices.len()))
    }

    /// 能流曲线的最新一个点
    pub fn latest_flow(&self) -> Option<&EnergyFlowPoint> {
        self.energy_flows.value()?.last()
    }
}

/// 实时监控视图模型
///
/// 切换时间范围会停止当前控制器并用新的 `time_range` 重新启动。
pub struct MonitoringView {
    api: Arc<dyn EnergyApi>,
    interval: Duration,
    controller: Mutex<Option<PollController<MonitoringPayload>>>,
    data: Arc<watch::Sender<MonitoringData>>,
}

impl MonitoringView {
    pub fn new(api: Arc<dyn EnergyApi>, interval: Duration) -> Self {
        let (data, _) = watch::channel(MonitoringData::default());
        Self {
            api,
            interval,
            controller: Mutex::new(None),
            data: Arc::new(data),
        }
    }

    fn reads(&self, range: TimeRange) -> Vec<Arc<dyn PollRead<MonitoringPayload>>> {
        vec![
            api_read(READ_DEVICES, self.api.clone(), |api| async move {
                api.monitoring_devices().await.map(MonitoringPayload::Devices).map_err(anyhow::Error::from)
            }),
            api_read(READ_ENERGY_FLOWS, self.api.clone(), move |api| async move {
                api.energy_flows(range).await.map(MonitoringPayload::EnergyFlows).map_err(anyhow::Error::from)
            }),
        ]
    }

    fn start_controller(&self, range: TimeRange) -> Result<PollController<MonitoringPayload>, PollError> {
        let controller = PollController::new(format!("monitoring-{}", range.as_str()));
        let data = self.data.clone();
        controller.start(self.reads(range), self.interval, move |report: RoundReport<MonitoringPayload>| {
            debug!(round = report.round, failed = report.failures(), "Monitoring round received");
            data.send_modify(|d| d.apply(&report));
        })?;
        Ok(controller)
    }

    /// 挂载视图，按当前时间范围开始轮询
    pub async fn mount(&self) -> Result<(), PollError> {
        let mut current = self.controller.lock().await;
        if current.is_some() {
            warn!("Monitoring view is already mounted");
            return Ok(());
        }
        let range = self.data.borrow().time_range;
        *current = Some(self.start_controller(range)?);
        Ok(())
    }

    /// 切换能流曲线的时间范围
    pub async fn set_time_range(&self, range: TimeRange) -> Result<(), PollError> {
        let mut current = self.controller.lock().await;
        let previous = self.data.borrow().time_range;
        if previous == range {
            return Ok(());
        }

        let mounted = match current.take() {
            Some(controller) => {
                controller.stop().await;
                true
            }
            None => false,
        };

        self.data.send_modify(|d| {
            d.time_range = range;
            d.energy_flows = Slot::Loading;
        });
        info!(from = previous.as_str(), to = range.as_str(), "Monitoring time range changed");

        if mounted {
            *current = Some(self.start_controller(range)?);
        }
        Ok(())
    }

    /// 卸载视图，停止轮询
    pub async fn unmount(&self) {
        if let Some(controller) = self.controller.lock().await.take() {
            controller.stop().await;
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.data.borrow().time_range
    }

    pub fn data(&self) -> MonitoringData {
        self.data.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitoringData> {
        self.data.subscribe()
    }

    pub async fn poll_state(&self) -> PollState {
        match self.controller.lock().await.as_ref() {
            Some(controller) => controller.state(),
            None => PollState::Idle,
        }
    }
}
