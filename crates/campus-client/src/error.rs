use thiserror::Error;

/// 后端 API 错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 网络或连接错误
    #[error("Request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 凭据错误或令牌失效（401/403）
    #[error("Unauthorized ({status}) at {endpoint}")]
    Unauthorized { endpoint: String, status: u16 },

    /// 其他非 2xx 响应
    #[error("Unexpected status {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 响应体解码失败
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// 地址错误
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP 客户端构建失败
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// API 结果类型
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// 是否属于认证失败（凭据错误、令牌过期或无效）
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// 出错的接口路径
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Network { endpoint, .. }
            | ApiError::Unauthorized { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => Some(endpoint),
            ApiError::InvalidUrl(_) | ApiError::Client(_) => None,
        }
    }
}
