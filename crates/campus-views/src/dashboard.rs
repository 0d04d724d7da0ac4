use campus_client::EnergyApi;
use campus_poll::{PollController, PollCycle, PollError, PollRead, PollState, ReadFailure, RoundReport};
use campus_types::{AiRecommendation, DeviceStatus, DeviceStatusEntry, Metric, PowerFlowPoint};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::reads::api_read;
use crate::Slot;

pub const READ_RECOMMENDATION: &str = "ai-recommendation";
pub const READ_METRICS: &str = "metrics";
pub const READ_POWER_FLOW: &str = "power-flow";
pub const READ_DEVICE_STATUS: &str = "device-status";

/// 仪表盘一轮读取的结果
#[derive(Debug, Clone)]
pub enum DashboardPayload {
    Recommendation(AiRecommendation),
    Metrics(Vec<Metric>),
    PowerFlow(Vec<PowerFlowPoint>),
    DeviceStatus(Vec<DeviceStatusEntry>),
}

/// 仪表盘各组件的数据
///
/// 读取失败时组件保留上一次的数据；从未成功过则保持骨架屏。
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub recommendation: Slot<String>,
    pub metrics: Slot<Vec<Metric>>,
    pub power_flow: Slot<Vec<PowerFlowPoint>>,
    pub device_status: Slot<Vec<DeviceStatusEntry>>,
    /// 最近一次合并的轮次
    pub round: u64,
}

impl DashboardData {
    fn apply(&mut self, report: &RoundReport<DashboardPayload>) {
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(DashboardPayload::Recommendation(value)) => {
                    self.recommendation.settle_or_keep(Ok(value.recommendation.clone()))
                }
                Ok(DashboardPayload::Metrics(value)) => self.metrics.settle_or_keep(Ok(value.clone())),
                Ok(DashboardPayload::PowerFlow(value)) => self.power_flow.settle_or_keep(Ok(value.clone())),
                Ok(DashboardPayload::DeviceStatus(value)) => {
                    self.device_status.settle_or_keep(Ok(value.clone()))
                }
                Err(failure) => self.keep_on_failure(failure),
            }
        }
        self.round = report.round;
    }

    fn keep_on_failure(&mut self, failure: &ReadFailure) {
        match failure.read.as_str() {
            READ_RECOMMENDATION => self.recommendation.settle_or_keep(Err(failure)),
            READ_METRICS => self.metrics.settle_or_keep(Err(failure)),
            READ_POWER_FLOW => self.power_flow.settle_or_keep(Err(failure)),
            READ_DEVICE_STATUS => self.device_status.settle_or_keep(Err(failure)),
            other => warn!(read = %other, "Unknown dashboard read"),
        }
    }

    /// 电池电量百分比（来自 `Battery Level` 指标）
    pub fn battery_percent(&self) -> Option<f64> {
        self.metrics
            .value()?
            .iter()
            .find(|m| m.title == Metric::BATTERY_LEVEL)
            .and_then(Metric::gauge_percent)
    }

    /// (在线数, 总数)
    pub fn online_devices(&self) -> Option<(usize, usize)> {
        let devices = self.device_status.value()?;
        let online = devices.iter().filter(|d| d.status == DeviceStatus::Online).count();
        Some((online, devices.len()))
    }

    /// 是否可以进入完整策略页
    pub fn strategy_available(&self) -> bool {
        self.recommendation.value().is_some()
    }
}

/// 仪表盘视图模型
pub struct DashboardView {
    api: Arc<dyn EnergyApi>,
    interval: Duration,
    controller: PollController<DashboardPayload>,
    data: Arc<watch::Sender<DashboardData>>,
}

impl DashboardView {
    pub fn new(api: Arc<dyn EnergyApi>, interval: Duration) -> Self {
        let (data, _) = watch::channel(DashboardData::default());
        Self {
            api,
            interval,
            controller: PollController::new("dashboard"),
            data: Arc::new(data),
        }
    }

    fn reads(&self) -> Vec<Arc<dyn PollRead<DashboardPayload>>> {
        vec![
            api_read(READ_RECOMMENDATION, self.api.clone(), |api| async move {
                api.ai_recommendation().await.map(DashboardPayload::Recommendation).map_err(anyhow::Error::from)
            }),
            api_read(READ_METRICS, self.api.clone(), |api| async move {
                api.metrics().await.map(DashboardPayload::Metrics).map_err(anyhow::Error::from)
            }),
            api_read(READ_POWER_FLOW, self.api.clone(), |api| async move {
                api.power_flow().await.map(DashboardPayload::PowerFlow).map_err(anyhow::Error::from)
            }),
            api_read(READ_DEVICE_STATUS, self.api.clone(), |api| async move {
                api.device_status().await.map(DashboardPayload::DeviceStatus).map_err(anyhow::Error::from)
            }),
        ]
    }

    /// 挂载视图，开始轮询
    pub fn mount(&self) -> Result<(), PollError> {
        let data = self.data.clone();
        self.controller.start(self.reads(), self.interval, move |report: RoundReport<DashboardPayload>| {
            debug!(round = report.round, failed = report.failures(), "Dashboard round received");
            data.send_modify(|d| d.apply(&report));
        })
    }

    /// 卸载视图，停止轮询
    pub async fn unmount(&self) {
        self.controller.stop().await;
    }

    pub fn data(&self) -> DashboardData {
        self.data.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardData> {
        self.data.subscribe()
    }

    pub fn poll_state(&self) -> PollState {
        self.controller.state()
    }

    pub fn poll_cycle(&self) -> PollCycle<DashboardPayload> {
        self.controller.snapshot()
    }
}
