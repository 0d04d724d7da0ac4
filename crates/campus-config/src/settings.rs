use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 客户端配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 后端 API 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// 单个请求的超时时间（秒）
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://campus-backend-8cq1.onrender.com/api/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// 令牌文件所在目录
    pub state_dir: PathBuf,
    /// 令牌槽位名称（即文件名）
    pub token_slot: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("./data"),
            token_slot: "campusEnergy_token".to_string(),
        }
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 21_000 }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// EnvFilter 语法，例如 `info,campus_poll=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.polling.interval(), Duration::from_secs(21));
        assert_eq!(config.session.token_slot, "campusEnergy_token");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.api.base_url.ends_with("/api/v1"));
    }
}
