use serde::{Deserialize, Serialize};
use std::fmt;

/// AI 节能建议（`GET /dashboard/ai-recommendation`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub recommendation: String,
}

/// 指标值，后端既会返回数字也会返回格式化后的字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// 取数值；字符串去掉千分位后解析开头的数字部分（"87%" -> 87，"1,240" -> 1240）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Text(s) => {
                let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
                let s = digits.as_str();
                let end = s
                    .char_indices()
                    .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
                    .map(|(i, _)| i)
                    .unwrap_or(s.len());
                s[..end].parse().ok()
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// 指标趋势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[serde(other)]
    Neutral,
}

/// 关键指标卡片（`GET /dashboard/metrics`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub title: String,
    pub value: MetricValue,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    pub icon: String,
    pub color: String,
}

impl Metric {
    pub const BATTERY_LEVEL: &'static str = "Battery Level";

    /// 电池电量指标显示为 0-100 的进度条，其他指标返回 None
    pub fn gauge_percent(&self) -> Option<f64> {
        if self.title != Self::BATTERY_LEVEL {
            return None;
        }
        self.value.as_f64().map(|v| v.clamp(0.0, 100.0))
    }
}

/// 功率曲线上的一个点（`GET /dashboard/power-flow`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFlowPoint {
    pub time: String,
    pub consumption: f64,
    pub solar: f64,
}

/// 设备在线状态
///
/// 只有 `online` 视为在线；其他取值（如 `maintenance`）归为 Unknown。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => f.write_str("Online"),
            DeviceStatus::Offline => f.write_str("Offline"),
            DeviceStatus::Unknown => f.write_str("Unknown"),
        }
    }
}

/// 仪表盘设备状态条目（`GET /dashboard/device-status`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatusEntry {
    pub name: String,
    pub status: DeviceStatus,
    pub power: f64,
}

impl DeviceStatusEntry {
    pub fn power_label(&self) -> String {
        format!("{:.2} kW", self.power)
    }
}
