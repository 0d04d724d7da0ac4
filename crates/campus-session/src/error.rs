use campus_client::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// 令牌存储错误
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("Token store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token store unavailable: {0}")]
    Unavailable(String),
}

/// 登录失败原因
///
/// 登录失败只会以返回值的形式交给调用方，会话状态保持不变。
#[derive(Error, Debug)]
pub enum AuthError {
    /// 凭据错误
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 登录请求失败（网络、5xx、解码）
    #[error("Login request failed: {0}")]
    Request(#[source] ApiError),

    /// 后端返回了空令牌
    #[error("Login response did not contain an access token")]
    EmptyToken,

    /// 新令牌无法取得用户信息
    #[error("Failed to fetch identity: {0}")]
    Identity(#[source] ApiError),

    /// 令牌无法持久化
    #[error("Failed to persist token: {0}")]
    Storage(#[from] TokenStoreError),
}
