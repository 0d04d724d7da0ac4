use async_trait::async_trait;
use campus_client::{ApiError, EnergyApi, Result};
use campus_types::{
    AiRecommendation, DeviceStatus, DeviceStatusEntry, EnergyFlowPoint, Metric, MetricValue,
    MonitoredDevice, PowerFlowPoint, TimeRange, Trend,
};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::dashboard::{READ_DEVICE_STATUS, READ_METRICS, READ_POWER_FLOW, READ_RECOMMENDATION};
use crate::monitoring::{READ_DEVICES, READ_ENERGY_FLOWS};

/// 内存中的假后端，按读取名注入失败
pub(crate) struct FakeEnergyApi {
    failing: Mutex<HashSet<&'static str>>,
    ranges: Mutex<Vec<TimeRange>>,
}

impl FakeEnergyApi {
    pub fn new() -> Self {
        Self {
            failing: Mutex::new(HashSet::new()),
            ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, read: &'static str) {
        self.failing.lock().unwrap().insert(read);
    }

    pub fn recover(&self, read: &'static str) {
        self.failing.lock().unwrap().remove(read);
    }

    /// 能流接口收到的时间范围，按调用顺序
    pub fn ranges(&self) -> Vec<TimeRange> {
        self.ranges.lock().unwrap().clone()
    }

    fn check(&self, read: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(read) {
            return Err(ApiError::Status {
                endpoint: format!("/{}", read),
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(())
    }
}

fn metric(title: &str, value: MetricValue, unit: &str) -> Metric {
    Metric {
        title: title.to_string(),
        value,
        unit: unit.to_string(),
        change: None,
        trend: Some(Trend::Neutral),
        icon: "Zap".to_string(),
        color: "text-primary".to_string(),
    }
}

fn device(name: &str, status: DeviceStatus) -> MonitoredDevice {
    MonitoredDevice {
        name: name.to_string(),
        device_type: "Load".to_string(),
        status,
        reading: "12.0 kW".to_string(),
        ip_address: "10.0.0.7".to_string(),
        last_polled: "2s ago".to_string(),
        icon: "Building".to_string(),
    }
}

#[async_trait]
impl EnergyApi for FakeEnergyApi {
    async fn ai_recommendation(&self) -> Result<AiRecommendation> {
        self.check(READ_RECOMMENDATION)?;
        Ok(AiRecommendation {
            recommendation: "Shift HVAC load to noon".to_string(),
        })
    }

    async fn metrics(&self) -> Result<Vec<Metric>> {
        self.check(READ_METRICS)?;
        Ok(vec![
            metric("Consumption", MetricValue::Number(412.3), "kW"),
            metric(Metric::BATTERY_LEVEL, MetricValue::Text("76%".to_string()), "%"),
        ])
    }

    async fn power_flow(&self) -> Result<Vec<PowerFlowPoint>> {
        self.check(READ_POWER_FLOW)?;
        Ok(vec![PowerFlowPoint {
            time: "12:00".to_string(),
            consumption: 400.0,
            solar: 120.0,
        }])
    }

    async fn device_status(&self) -> Result<Vec<DeviceStatusEntry>> {
        self.check(READ_DEVICE_STATUS)?;
        Ok(vec![
            DeviceStatusEntry {
                name: "Main Inverter".to_string(),
                status: DeviceStatus::Online,
                power: 41.5,
            },
            DeviceStatusEntry {
                name: "Chiller 2".to_string(),
                status: DeviceStatus::Offline,
                power: 0.0,
            },
        ])
    }

    async fn monitoring_devices(&self) -> Result<Vec<MonitoredDevice>> {
        self.check(READ_DEVICES)?;
        Ok(vec![
            device("Building A", DeviceStatus::Online),
            device("Building B", DeviceStatus::Online),
            device("Building C", DeviceStatus::Offline),
        ])
    }

    async fn energy_flows(&self, range: TimeRange) -> Result<Vec<EnergyFlowPoint>> {
        self.ranges.lock().unwrap().push(range);
        self.check(READ_ENERGY_FLOWS)?;
        let points = match range {
            TimeRange::SixHours => 6,
            TimeRange::TwentyFourHours => 24,
            TimeRange::SevenDays => 7,
        };
        Ok((0..points)
            .map(|i| EnergyFlowPoint {
                time: format!("{:02}:00", i),
                grid_import: 80.0,
                solar_production: 40.0,
                battery_discharge: 0.0,
                building_a_load: 50.0,
                building_b_load: 40.0,
                building_c_load: 30.0,
            })
            .collect())
    }
}
