use async_trait::async_trait;
use campus_config::ApiConfig;
use campus_types::{
    AiRecommendation, DeviceStatusEntry, EnergyFlowPoint, LoginResponse, Metric, MonitoredDevice,
    PowerFlowPoint, TimeRange, User,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{ApiError, AuthApi, BearerToken, EnergyApi, Result, TokenReader};

/// 基于 reqwest 的后端客户端
///
/// 每次构造请求时读取一次共享令牌并附加 `Authorization: Bearer` 头。
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    token: TokenReader,
}

impl HttpClient {
    /// 创建客户端
    ///
    /// # 参数
    /// * `base_url` - API 根地址，例如 `http://localhost:8000/api/v1`
    /// * `timeout` - 单个请求超时
    /// * `token` - 共享令牌读端
    pub fn new(base_url: &str, timeout: Duration, token: TokenReader) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join 会替换最后一段路径，根地址必须以 '/' 结尾
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &ApiConfig, token: TokenReader) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), token)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self.client.get(self.endpoint(path)?);
        if !query.is_empty() {
            request = request.query(query);
        }
        // 令牌快照在这里取，之后的变化不会影响本次请求
        if let Some(token) = self.token.current() {
            request = request.bearer_auth(token.expose());
        }
        Self::execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(path: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|source| ApiError::Network {
            endpoint: path.to_string(),
            source,
        })?;
        debug!(endpoint = %path, status = %response.status(), "Response received");
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Network {
            endpoint: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let path = "/auth/login";
        let request = self
            .client
            .post(self.endpoint(path)?)
            .form(&[("username", username), ("password", password)]);
        Self::execute(path, request).await
    }

    async fn current_user(&self, token: &BearerToken) -> Result<User> {
        let path = "/auth/me";
        let request = self
            .client
            .get(self.endpoint(path)?)
            .bearer_auth(token.expose());
        Self::execute(path, request).await
    }
}

#[async_trait]
impl EnergyApi for HttpClient {
    async fn ai_recommendation(&self) -> Result<AiRecommendation> {
        self.get_json("/dashboard/ai-recommendation", &[]).await
    }

    async fn metrics(&self) -> Result<Vec<Metric>> {
        self.get_json("/dashboard/metrics", &[]).await
    }

    async fn power_flow(&self) -> Result<Vec<PowerFlowPoint>> {
        self.get_json("/dashboard/power-flow", &[]).await
    }

    async fn device_status(&self) -> Result<Vec<DeviceStatusEntry>> {
        self.get_json("/dashboard/device-status", &[]).await
    }

    async fn monitoring_devices(&self) -> Result<Vec<MonitoredDevice>> {
        self.get_json("/monitoring/devices", &[]).await
    }

    async fn energy_flows(&self, range: TimeRange) -> Result<Vec<EnergyFlowPoint>> {
        self.get_json("/monitoring/energy-flows", &[("time_range", range.as_str())])
            .await
    }
}
