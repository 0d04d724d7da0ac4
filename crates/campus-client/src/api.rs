use async_trait::async_trait;
use campus_types::{
    AiRecommendation, DeviceStatusEntry, EnergyFlowPoint, LoginResponse, Metric, MonitoredDevice,
    PowerFlowPoint, TimeRange, User,
};

use crate::{BearerToken, Result};

/// 认证接口
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// 提交凭据换取访问令牌（`POST /auth/login`，表单编码）
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// 用指定令牌查询当前用户（`GET /auth/me`）
    async fn current_user(&self, token: &BearerToken) -> Result<User>;
}

/// 能源数据读取接口，请求携带共享令牌
#[async_trait]
pub trait EnergyApi: Send + Sync {
    async fn ai_recommendation(&self) -> Result<AiRecommendation>;

    async fn metrics(&self) -> Result<Vec<Metric>>;

    async fn power_flow(&self) -> Result<Vec<PowerFlowPoint>>;

    async fn device_status(&self) -> Result<Vec<DeviceStatusEntry>>;

    async fn monitoring_devices(&self) -> Result<Vec<MonitoredDevice>>;

    async fn energy_flows(&self, range: TimeRange) -> Result<Vec<EnergyFlowPoint>>;
}
