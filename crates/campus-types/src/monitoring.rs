use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::DeviceStatus;

/// 实时监控设备（`GET /monitoring/devices`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredDevice {
    pub name: String,
    /// Grid / Solar / Battery / Load
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: DeviceStatus,
    pub reading: String,
    pub ip_address: String,
    pub last_polled: String,
    pub icon: String,
}

impl MonitoredDevice {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}

/// 能流时间序列上的一个点（`GET /monitoring/energy-flows`）
///
/// 单位均为 kW，缺失的数据源按 0 处理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyFlowPoint {
    pub time: String,
    #[serde(default)]
    pub grid_import: f64,
    #[serde(default)]
    pub solar_production: f64,
    #[serde(default)]
    pub battery_discharge: f64,
    #[serde(default, rename = "buildingALoad")]
    pub building_a_load: f64,
    #[serde(default, rename = "buildingBLoad")]
    pub building_b_load: f64,
    #[serde(default, rename = "buildingCLoad")]
    pub building_c_load: f64,
}

impl EnergyFlowPoint {
    /// 供给侧合计：电网 + 光伏 + 电池
    pub fn total_supply(&self) -> f64 {
        self.grid_import + self.solar_production + self.battery_discharge
    }

    /// 负载侧合计：三栋建筑
    pub fn total_load(&self) -> f64 {
        self.building_a_load + self.building_b_load + self.building_c_load
    }
}

/// 能流曲线的时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "6H")]
    SixHours,
    #[default]
    #[serde(rename = "24H")]
    TwentyFourHours,
    #[serde(rename = "7D")]
    SevenDays,
}

impl TimeRange {
    /// `time_range` 查询参数的取值
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::SixHours => "6H",
            TimeRange::TwentyFourHours => "24H",
            TimeRange::SevenDays => "7D",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown time range: {0} (expected 6H, 24H or 7D)")]
pub struct ParseTimeRangeError(pub String);

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "6H" => Ok(TimeRange::SixHours),
            "24H" => Ok(TimeRange::TwentyFourHours),
            "7D" => Ok(TimeRange::SevenDays),
            _ => Err(ParseTimeRangeError(s.to_string())),
        }
    }
}
